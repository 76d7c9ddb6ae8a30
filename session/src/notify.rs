use quiz::QuestionResult;

/// Feedback side-channel (sounds, bells), injected into the controller and
/// invoked once per terminal verdict. Stateless from the controller's point
/// of view.
pub trait Notify: Send + Sync {
    fn verdict(&self, result: QuestionResult);
}

/// Does nothing.
pub struct NoopNotify;

impl Notify for NoopNotify {
    fn verdict(&self, _result: QuestionResult) {}
}
