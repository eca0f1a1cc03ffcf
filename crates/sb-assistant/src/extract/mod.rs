//! Pattern extractor: a declarative rule table evaluated uniformly.
//!
//! Each [`Rule`] names an operation, the trigger phrases that make it
//! applicable, one primary regex with named captures, and any optional
//! scans, keyword choices, flags and fixed values. Evaluation for a routed
//! domain walks the table in order:
//!
//! 1. a rule applies when any trigger phrase occurs in the message;
//! 2. the first applicable rule whose primary regex matches and whose
//!    required fields all parse wins;
//! 3. applicable rules that all failed yield the first one's usage hint;
//! 4. no applicable rule at all yields the domain menu.
//!
//! Extraction never guesses: a malformed number or an absent required
//! field is a non-match.

pub mod rules;

use regex::Regex;
use sb_commerce::coupons;
use sb_protocol::{Domain, Operation, ParamValue, ParameterSet, ResolutionError, format_number};

use crate::error::BuildError;

pub use rules::RULES;

// ── Rule vocabulary ─────────────────────────────────────────────

/// How a captured string becomes a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed, non-empty text.
    Text,
    /// Base-10 `i64`.
    Integer,
    /// Decimal `f64`.
    Number,
    /// Validated decimal kept as text, e.g. a price sent verbatim to the store.
    NumericText,
    /// Captured word mapped to a fixed value.
    Choice(&'static [(&'static str, &'static str)]),
    /// Items split on the separator, trimmed, empties dropped.
    List(&'static str),
}

/// A constant parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Text(&'static str),
    Int(i64),
    Bool(bool),
}

impl Literal {
    fn value(self) -> ParamValue {
        match self {
            Self::Text(s) => ParamValue::from(s),
            Self::Int(n) => ParamValue::Int(n),
            Self::Bool(b) => ParamValue::Bool(b),
        }
    }
}

/// Value source for a parameter filled in after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// `<PREFIX><amount>_<4 random digits>`, prefix chosen by discount type.
    CouponCode,
}

impl Generator {
    fn generate(self, params: &ParameterSet) -> ParamValue {
        match self {
            Self::CouponCode => {
                let discount_type = params.text("discount_type").unwrap_or_else(|| "percent".into());
                let amount = params.number("amount").map(format_number).unwrap_or_default();
                ParamValue::Text(coupons::generate_code(coupons::prefix_for(&discount_type), &amount))
            }
        }
    }
}

/// What to do when a scan finds nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// The rule does not match.
    Required,
    /// Leave the parameter out.
    Omit,
    Literal(Literal),
    Generate(Generator),
}

/// A named group of the primary pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capture {
    pub param: &'static str,
    pub group: &'static str,
    pub kind: FieldKind,
}

/// A secondary regex searched anywhere in the message. Its pattern must
/// have a named group `v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scan {
    pub param: &'static str,
    pub pattern: &'static str,
    pub kind: FieldKind,
    pub fallback: Fallback,
}

/// Picks a value by which keyword occurs in the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordChoice {
    pub param: &'static str,
    pub options: &'static [(&'static str, &'static str)],
    pub default: Option<&'static str>,
}

/// Boolean parameter set by the presence of a keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flag {
    pub param: &'static str,
    pub keyword: &'static str,
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub operation: Operation,
    pub triggers: &'static [&'static str],
    pub pattern: &'static str,
    pub captures: &'static [Capture],
    pub scans: &'static [Scan],
    pub keywords: &'static [KeywordChoice],
    pub flags: &'static [Flag],
    pub fixed: &'static [(&'static str, Literal)],
    /// Usage example shown when the rule applies but cannot be filled.
    pub hint: &'static str,
}

impl Rule {
    pub const fn new(operation: Operation, triggers: &'static [&'static str], pattern: &'static str) -> Self {
        Self {
            operation,
            triggers,
            pattern,
            captures: &[],
            scans: &[],
            keywords: &[],
            flags: &[],
            fixed: &[],
            hint: "",
        }
    }

    pub const fn captures(mut self, captures: &'static [Capture]) -> Self {
        self.captures = captures;
        self
    }

    pub const fn scans(mut self, scans: &'static [Scan]) -> Self {
        self.scans = scans;
        self
    }

    pub const fn keywords(mut self, keywords: &'static [KeywordChoice]) -> Self {
        self.keywords = keywords;
        self
    }

    pub const fn flags(mut self, flags: &'static [Flag]) -> Self {
        self.flags = flags;
        self
    }

    pub const fn fixed(mut self, fixed: &'static [(&'static str, Literal)]) -> Self {
        self.fixed = fixed;
        self
    }

    pub const fn hint(mut self, hint: &'static str) -> Self {
        self.hint = hint;
        self
    }

    fn applies(&self, lower: &str) -> bool {
        self.triggers.iter().any(|t| lower.contains(t))
    }
}

// ── Field parsing ───────────────────────────────────────────────

/// Trim whitespace, surrounding quotes and trailing sentence punctuation,
/// repeatedly, so `"name".` and `name."` both come out bare.
fn clean_text(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    loop {
        let next = text
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '״' | '“' | '”'))
            .trim_end_matches(['.', '!', '?'])
            .trim();
        if next == text {
            break;
        }
        text = next;
    }
    (!text.is_empty()).then(|| text.to_string())
}

fn is_decimal(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next();
    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

impl FieldKind {
    /// Parse a captured string. `None` means the capture is unusable.
    pub fn parse(self, raw: &str) -> Option<ParamValue> {
        let trimmed = raw.trim();
        match self {
            Self::Text => clean_text(raw).map(ParamValue::Text),
            Self::Integer => {
                if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                trimmed.parse::<i64>().ok().map(ParamValue::Int)
            }
            Self::Number => is_decimal(trimmed)
                .then(|| trimmed.parse::<f64>().ok())
                .flatten()
                .filter(|f| f.is_finite())
                .map(ParamValue::Float),
            Self::NumericText => is_decimal(trimmed).then(|| ParamValue::Text(trimmed.to_string())),
            Self::Choice(options) => options
                .iter()
                .find(|(word, _)| *word == trimmed)
                .map(|(_, value)| ParamValue::from(*value)),
            Self::List(separator) => {
                let items: Vec<String> = trimmed
                    .split(separator)
                    .filter_map(clean_text)
                    .collect();
                (!items.is_empty()).then(|| ParamValue::from(items))
            }
        }
    }
}

// ── Extraction ──────────────────────────────────────────────────

/// Result of a successful extraction.
///
/// Generated values (such as coupon codes) are not part of `parameters`
/// until [`Extraction::into_parameters`] is called, which keeps
/// [`PatternExtractor::extract`] free of side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub operation: Operation,
    pub parameters: ParameterSet,
    pending: Vec<(&'static str, Generator)>,
}

impl Extraction {
    /// Parameters still to be generated.
    pub fn pending(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pending.iter().map(|(param, _)| *param)
    }

    /// Final parameter set with generated values filled in.
    pub fn into_parameters(self) -> ParameterSet {
        let Self { mut parameters, pending, .. } = self;
        for (param, generator) in pending {
            let value = generator.generate(&parameters);
            parameters.insert(param, value);
        }
        parameters
    }
}

struct CompiledRule {
    rule: &'static Rule,
    pattern: Regex,
    scans: Vec<Regex>,
}

impl CompiledRule {
    fn compile(rule: &'static Rule) -> Result<Self, BuildError> {
        let err = |source| BuildError::Pattern {
            operation: rule.operation.to_string(),
            source,
        };
        let pattern = Regex::new(rule.pattern).map_err(err)?;
        let scans = rule
            .scans
            .iter()
            .map(|p| Regex::new(p.pattern).map_err(err))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rule, pattern, scans })
    }

    fn extract(&self, text: &str, lower: &str) -> Option<Extraction> {
        let rule = self.rule;
        let caps = self.pattern.captures(text)?;
        let mut params = ParameterSet::new();

        for capture in rule.captures {
            let raw = caps.name(capture.group)?.as_str();
            params.insert(capture.param, capture.kind.parse(raw)?);
        }

        let mut pending = Vec::new();
        for (scan, regex) in rule.scans.iter().zip(&self.scans) {
            let found = regex
                .captures(text)
                .and_then(|c| c.name("v"))
                .map(|m| m.as_str());
            if let Some(raw) = found {
                // Present but malformed is a non-match, never a guess.
                params.insert(scan.param, scan.kind.parse(raw)?);
                continue;
            }
            match scan.fallback {
                Fallback::Required => return None,
                Fallback::Omit => {}
                Fallback::Literal(literal) => params.insert(scan.param, literal.value()),
                Fallback::Generate(generator) => pending.push((scan.param, generator)),
            }
        }

        for choice in rule.keywords {
            let picked = choice
                .options
                .iter()
                .find(|(keyword, _)| lower.contains(keyword))
                .map(|(_, value)| *value)
                .or(choice.default);
            if let Some(value) = picked {
                params.insert(choice.param, value);
            }
        }

        for flag in rule.flags {
            params.insert(flag.param, lower.contains(flag.keyword));
        }

        for (param, literal) in rule.fixed {
            params.insert(*param, literal.value());
        }

        Some(Extraction {
            operation: rule.operation,
            parameters: params,
            pending,
        })
    }
}

/// Compiled rule table. Stateless after construction and safe to share.
pub struct PatternExtractor {
    rules: Vec<CompiledRule>,
}

impl PatternExtractor {
    /// Compile the built-in table.
    pub fn new() -> Result<Self, BuildError> {
        Self::with_rules(RULES)
    }

    pub fn with_rules(rules: &'static [Rule]) -> Result<Self, BuildError> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Rules for `domain`, in evaluation order.
    pub fn rules_for(&self, domain: Domain) -> impl Iterator<Item = &'static Rule> + '_ {
        self.rules
            .iter()
            .map(|c| c.rule)
            .filter(move |r| r.operation.domain() == domain)
    }

    /// Extract an operation and its parameters from a message already
    /// routed to `domain`.
    pub fn extract(&self, domain: Domain, message: &str) -> Result<Extraction, ResolutionError> {
        let text = message.trim();
        let lower = text.to_lowercase();
        let mut first_applicable: Option<&Rule> = None;

        for compiled in self.rules.iter().filter(|c| c.rule.operation.domain() == domain) {
            if !compiled.rule.applies(&lower) {
                continue;
            }
            first_applicable.get_or_insert(compiled.rule);
            if let Some(extraction) = compiled.extract(text, &lower) {
                return Ok(extraction);
            }
        }

        match first_applicable {
            Some(rule) => Err(ResolutionError::UnrecognizedOperation {
                operation: rule.operation,
                hint: rule.hint.to_string(),
            }),
            None => Err(ResolutionError::NoMatchingOperation { domain }),
        }
    }
}
