use regex::Regex;

/// Category given to anything no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Confidence of an unmatched guess; always below the review threshold.
pub const FALLBACK_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Contains,
    StartsWith,
    Regex,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    match_type: MatchType,
    /// Compiled once for [`MatchType::Regex`]; `None` for an invalid pattern.
    regex: Option<Regex>,
    pub category: String,
    /// Normalized merchant name to attach on a hit.
    pub merchant: Option<String>,
    pub priority: i64,
    pub confidence: u8,
}

impl Rule {
    fn new(pattern: &str, category: &str, merchant: Option<&str>) -> Self {
        Self {
            pattern: pattern.to_string(),
            match_type: MatchType::Contains,
            regex: None,
            category: category.to_string(),
            merchant: merchant.map(str::to_string),
            priority: 0,
            confidence: 95,
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self.regex = match match_type {
            MatchType::Regex => match Regex::new(&self.pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("rule pattern {:?} is not a valid regex: {e}", self.pattern);
                    None
                }
            },
            _ => None,
        };
        self
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn matches(&self, description: &str) -> bool {
        match self.match_type {
            MatchType::Contains => description
                .to_uppercase()
                .contains(&self.pattern.to_uppercase()),
            MatchType::StartsWith => description
                .to_uppercase()
                .starts_with(&self.pattern.to_uppercase()),
            MatchType::Regex => self
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(description)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    pub category: String,
    pub merchant: Option<String>,
    pub confidence: u8,
}

/// Keyword rules standing in for the app's "AI" categorization.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = vec![
        Rule::new("WHOLE FOODS", "Food & Dining", Some("Whole Foods")),
        Rule::new("STARBUCKS", "Food & Dining", Some("Starbucks")),
        Rule::new("CHIPOTLE", "Food & Dining", Some("Chipotle")),
        Rule::new("NETFLIX", "Entertainment", Some("Netflix")),
        Rule::new("SPOTIFY", "Entertainment", Some("Spotify")),
        Rule::new("AMC", "Entertainment", Some("AMC Theatres")),
        Rule::new("SHELL", "Transportation", Some("Shell")),
        Rule::new("LYFT", "Transportation", Some("Lyft")),
        Rule::new("AMAZON", "Shopping", Some("Amazon")),
        Rule::new("TARGET", "Shopping", Some("Target")),
        Rule::new("RENT", "Housing", None),
        Rule::new("PG&E", "Utilities", Some("PG&E")),
        Rule::new("COMCAST", "Utilities", Some("Comcast")),
        Rule::new("PAYROLL", "Income", None),
    ];
    rules.push(Rule {
        priority: 20,
        ..Rule::new("UBER EATS", "Food & Dining", Some("Uber Eats"))
    });
    rules.push(Rule {
        priority: 10,
        ..Rule::new("UBER", "Transportation", Some("Uber")).with_match_type(MatchType::StartsWith)
    });
    rules.push(Rule {
        confidence: 92,
        ..Rule::new(r"(?i)^(direct dep|deposit)\b", "Income", None).with_match_type(MatchType::Regex)
    });
    rules
}

/// Pick the highest-priority rule matching `description`. Rules of equal
/// priority keep their list order.
pub fn categorize(description: &str, rules: &[Rule]) -> Categorization {
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    match ordered.into_iter().find(|r| r.matches(description)) {
        Some(rule) => Categorization {
            category: rule.category.clone(),
            merchant: rule.merchant.clone(),
            confidence: rule.confidence,
        },
        None => {
            log::warn!("no rule matched {description:?}, flagging for review");
            Categorization {
                category: UNCATEGORIZED.to_string(),
                merchant: None,
                confidence: FALLBACK_CONFIDENCE,
            }
        }
    }
}
