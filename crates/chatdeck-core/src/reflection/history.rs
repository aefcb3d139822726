use serde::ser::{Serialize, SerializeMap, Serializer};

pub const FINAL_CONTENT_KEY: &str = "final_content";

pub fn round_key(round: usize) -> String {
    format!("round_{round}")
}

/// Per-round output of one optimization run.
///
/// `round_0` is the untouched input. `final_content` is not stored separately;
/// it is always the most recent round, so it cannot drift from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationHistory {
    rounds: Vec<String>,
}

impl OptimizationHistory {
    pub(crate) fn new(initial_content: impl Into<String>) -> Self {
        Self {
            rounds: vec![initial_content.into()],
        }
    }

    /// Append the output of `round`. Rounds are recorded strictly in order.
    pub(crate) fn record(&mut self, round: usize, content: impl Into<String>) {
        debug_assert_eq!(round, self.rounds.len(), "rounds must be recorded in order");
        self.rounds.push(content.into());
    }

    pub fn initial(&self) -> &str {
        &self.rounds[0]
    }

    pub fn round(&self, round: usize) -> Option<&str> {
        self.rounds.get(round).map(String::as_str)
    }

    pub fn final_content(&self) -> &str {
        self.rounds.last().map(String::as_str).unwrap_or_default()
    }

    /// Look up by history key: `round_N` or `final_content`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == FINAL_CONTENT_KEY {
            return Some(self.final_content());
        }
        let index = key.strip_prefix("round_")?;
        if index.len() > 1 && index.starts_with('0') {
            return None;
        }
        self.round(index.parse().ok()?)
    }

    /// Number of stored rounds, `round_0` included.
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Always false: `round_0` is present from construction.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Refinement calls that produced this history.
    pub fn refinements(&self) -> usize {
        self.rounds.len() - 1
    }

    /// `round_0 .. round_{N-1}` followed by `final_content`.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = (0..self.rounds.len()).map(round_key).collect();
        keys.push(FINAL_CONTENT_KEY.to_string());
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.rounds
            .iter()
            .enumerate()
            .map(|(i, content)| (round_key(i), content.as_str()))
            .chain(std::iter::once((
                FINAL_CONTENT_KEY.to_string(),
                self.final_content(),
            )))
    }

    pub fn into_final(mut self) -> String {
        self.rounds.pop().unwrap_or_default()
    }
}

impl Serialize for OptimizationHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rounds.len() + 1))?;
        for (key, content) in self.iter() {
            map.serialize_entry(&key, content)?;
        }
        map.end()
    }
}
