mod chained;
pub use chained::ChainedPipe;

/// A single stage of the colorizing pipeline.
///
/// `process` returning `Ok(None)` drops the input: the remaining stages of a
/// chain are not run for it.
pub trait Pipe {
    type Input;
    type Output;

    type Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error>;

    fn pipe<P>(self, other: P) -> ChainedPipe<Self, P>
    where
        Self: Sized,
        P: Pipe<Input = Self::Output, Error = Self::Error>,
    {
        ChainedPipe::new(self, other)
    }

    fn close(&mut self) {}
}
