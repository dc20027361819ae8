use regex::RegexSet;

/// Which call targets count as taint sources or sanitizers. Patterns are
/// regexes matched against the callee name; a call matching `sources` is
/// asserted tainted, one matching `sanitizers` blocks taint propagation
/// through it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyConfig {
    pub sources: Vec<String>,
    pub sanitizers: Vec<String>,
}

#[derive(Debug)]
pub struct Policy {
    sources: RegexSet,
    sanitizers: RegexSet,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            sources: RegexSet::new::<[String; 0], _>([]).unwrap(),
            sanitizers: RegexSet::new::<[String; 0], _>([]).unwrap(),
        }
    }
}

impl Policy {
    pub fn new(config: &PolicyConfig) -> Result<Self, regex::Error> {
        Ok(Policy {
            sources: RegexSet::new(&config.sources)?,
            sanitizers: RegexSet::new(&config.sanitizers)?,
        })
    }

    pub fn is_source(&self, callee: &str) -> bool {
        self.sources.is_match(callee)
    }

    pub fn is_sanitizer(&self, callee: &str) -> bool {
        self.sanitizers.is_match(callee)
    }
}
