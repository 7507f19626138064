use tracing::info;

/// Receives schema setup progress.
pub trait ProgressIndicator {
    /// Called once with the number of steps about to run.
    fn initialise(&mut self, steps: usize);

    fn move_to(&mut self, step: usize, message: &str);

    /// Last step reported.
    fn value(&self) -> usize;
}

/// Reports each step at `info`.
#[derive(Debug, Clone, Default)]
pub struct TracingProgress {
    steps: usize,
    current: usize,
}

impl ProgressIndicator for TracingProgress {
    fn initialise(&mut self, steps: usize) {
        self.steps = steps;
        self.current = 0;
        info!(steps, "schema setup starting");
    }

    fn move_to(&mut self, step: usize, message: &str) {
        self.current = step;
        info!(step, steps = self.steps, "{message}");
    }

    fn value(&self) -> usize {
        self.current
    }
}

/// Tracks the step without reporting it.
#[derive(Debug, Clone, Default)]
pub struct NoProgress {
    current: usize,
}

impl ProgressIndicator for NoProgress {
    fn initialise(&mut self, _steps: usize) {
        self.current = 0;
    }

    fn move_to(&mut self, step: usize, _message: &str) {
        self.current = step;
    }

    fn value(&self) -> usize {
        self.current
    }
}
