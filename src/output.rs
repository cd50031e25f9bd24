use std::io::Write;

/// Destination for everything the tool tells the operator.
pub trait Sink: Send + Sync {
    fn out(&self, message: &str);
    fn err(&self, message: &str);
}

/// Writes to stdout and stderr.
pub struct Console;

impl Sink for Console {
    fn out(&self, message: &str) {
        // A closed pipe (e.g. `| head`) is not worth failing over.
        let _ = writeln!(std::io::stdout().lock(), "{message}");
    }

    fn err(&self, message: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}

/// Drops everything; backs `--quiet`.
pub struct Silent;

impl Sink for Silent {
    fn out(&self, _message: &str) {}

    fn err(&self, _message: &str) {}
}

#[cfg(test)]
pub mod testing {
    use super::Sink;
    use std::sync::Mutex;

    /// Captures output for assertions.
    #[derive(Default)]
    pub struct Recorder {
        pub out: Mutex<Vec<String>>,
        pub err: Mutex<Vec<String>>,
    }

    impl Recorder {
        pub fn out_lines(&self) -> Vec<String> {
            self.out.lock().unwrap().clone()
        }

        pub fn err_lines(&self) -> Vec<String> {
            self.err.lock().unwrap().clone()
        }
    }

    impl Sink for Recorder {
        fn out(&self, message: &str) {
            self.out.lock().unwrap().push(message.to_string());
        }

        fn err(&self, message: &str) {
            self.err.lock().unwrap().push(message.to_string());
        }
    }
}
