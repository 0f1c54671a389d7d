use indexmap::IndexMap;
use regex::bytes::{Regex, RegexBuilder};

/// Prompts may wrap across lines, so `.` also matches a newline.
pub fn compile_prompt(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).dot_matches_new_line(true).build()
}

/// Answers one interactive prompt. `seen` is the offset into the output
/// stream up to which this watcher has already answered.
#[derive(Debug, Clone)]
pub struct Responder {
    pattern: Regex,
    response: String,
    seen: usize,
}

impl Responder {
    pub fn new(pattern: &str, response: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: compile_prompt(pattern)?,
            response: response.into(),
            seen: 0,
        })
    }

    /// One response per match in the unseen tail. The tail is only consumed
    /// on a match, so a prompt split across reads still fires later.
    fn submit(&mut self, stream: &[u8], out: &mut Vec<String>) {
        let tail = &stream[self.seen.min(stream.len())..];
        let hits = self.pattern.find_iter(tail).count();
        if hits > 0 {
            self.seen = stream.len();
            out.extend(std::iter::repeat(format!("{}\n", self.response)).take(hits));
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Responders {
    watchers: Vec<Responder>,
}

impl Responders {
    pub fn compile(responses: &IndexMap<String, String>) -> Result<Self, regex::Error> {
        let watchers = responses
            .iter()
            .map(|(pattern, response)| Responder::new(pattern, response.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { watchers })
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Feeds the whole output captured so far and returns what should be
    /// written to the remote stdin, in watcher order.
    pub fn submit(&mut self, stream: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        for watcher in &mut self.watchers {
            watcher.submit(stream, &mut out);
        }
        out
    }
}
