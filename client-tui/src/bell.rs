use quiz::QuestionResult;
use session::Notify;
use std::io::Write;

/// Terminal bell on wrong or timed-out answers. Correct answers stay quiet.
pub struct BellNotify;

impl Notify for BellNotify {
    fn verdict(&self, result: QuestionResult) {
        if matches!(result, QuestionResult::Wrong | QuestionResult::TimedOut) {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }
}
