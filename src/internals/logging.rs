use log::error;

/// Logs a diagnostic through the `log` facade and turns it into a
/// failed result in one move.
pub trait Logging {
    fn to_error<A>(&self) -> anyhow::Result<A>;
}

impl<S: AsRef<str>> Logging for S {
    fn to_error<A>(&self) -> anyhow::Result<A> {
        error!("{}", self.as_ref());
        Err(anyhow::anyhow!("{}", self.as_ref()))
    }
}
