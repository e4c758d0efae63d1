use std::fmt;

/// Narrow handle into the host test framework.
///
/// The engine only marks helper frames and aborts the running test; test
/// lifecycle, naming and reporting stay with the host.
pub trait TestReporter {
    /// Mark the calling frame as a helper so failures point at the test.
    fn helper(&self) {}

    /// Abort the current test with a formatted message.
    #[track_caller]
    fn fatal(&self, message: fmt::Arguments<'_>) -> !;
}

/// Host for plain `#[test]` functions: aborting panics the test thread.
///
/// Entry points are `#[track_caller]`, so the panic location is the line in
/// the calling test rather than engine code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl TestReporter for PanicReporter {
    #[track_caller]
    fn fatal(&self, message: fmt::Arguments<'_>) -> ! {
        panic!("{message}")
    }
}
