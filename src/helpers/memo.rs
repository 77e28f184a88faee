/// Single-entry cache remembering the last input and its result.
///
/// Inputs are compared by value, so a freshly built but equal input array
/// hits the cache.
#[derive(Debug, Clone)]
pub struct Memo<I, O> {
    last: Option<(I, O)>,
}

impl<I, O> Default for Memo<I, O> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<I: PartialEq, O: Clone> Memo<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `input`, computing and storing it on a miss
    pub fn get_or_compute(&mut self, input: I, compute: impl FnOnce(&I) -> O) -> O {
        if let Some((last_input, last_output)) = &self.last {
            if *last_input == input {
                return last_output.clone();
            }
        }
        let output = compute(&input);
        self.last = Some((input, output.clone()));
        output
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
