use super::Pipe;

#[derive(Debug)]
pub struct ChainedPipe<I, O> {
    input: I,
    output: O,
}

impl<I, O> ChainedPipe<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (I, O) {
        (self.input, self.output)
    }
}

impl<I, O> Pipe for ChainedPipe<I, O>
where
    I: Pipe,
    O: Pipe<Input = I::Output, Error = I::Error>,
{
    type Input = I::Input;
    type Output = O::Output;
    type Error = O::Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        self.input.process(input).and_then(|input| {
            input
                .map(|input| self.output.process(input))
                .transpose()
                .map(Option::flatten)
        })
    }

    fn close(&mut self) {
        self.input.close();
        self.output.close();
    }
}
