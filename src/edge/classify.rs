//! User-agent classification.
//!
//! Patterns live in an ordered data table so new signatures can be added
//! without touching the matching logic.

use crate::GateError;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Classification of a request's user-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAgentClass {
    /// Link-preview fetcher run by a chat or social platform.
    SocialPreview,
    /// Generic crawler, scraper, HTTP library or AI crawler.
    Bot,
    /// Missing or implausibly short user-agent.
    Suspicious,
    /// Anything else.
    Ordinary,
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct UaRule {
    /// Regex, matched case-insensitively anywhere in the user-agent.
    pub pattern: &'static str,
    /// Class assigned on match. Only `SocialPreview` and `Bot` are allowed.
    pub class: UserAgentClass,
}

/// Known social/chat link-preview crawlers.
pub const SOCIAL_PREVIEW_PATTERN: &str =
    r"twitterbot|facebookexternalhit|linkedinbot|slackbot|telegrambot|whatsapp|discordbot|redditbot";

/// Generic crawler terms, named scrapers, HTTP client libraries and AI crawlers.
pub const BOT_PATTERN: &str = concat!(
    r"bot|crawl|spider|slurp|archiver|wget|curl/|python-requests|scrapy|httpclient|",
    r"go-http|java/|libwww|perl|ruby|php/|ahrefsbot|semrushbot|mj12bot|dotbot|",
    r"baiduspider|yandexbot|sogou|bytespider|petalbot|gptbot|claudebot|ccbot",
);

/// User-agents shorter than this many UTF-16 code units are suspicious.
pub const MIN_USER_AGENT_LEN: usize = 10;

/// Production table, in evaluation order.
pub const STANDARD_RULES: &[UaRule] = &[
    UaRule {
        pattern: SOCIAL_PREVIEW_PATTERN,
        class: UserAgentClass::SocialPreview,
    },
    UaRule {
        pattern: BOT_PATTERN,
        class: UserAgentClass::Bot,
    },
];

static STANDARD: Lazy<UaClassifier> =
    Lazy::new(|| UaClassifier::new(STANDARD_RULES).expect("standard UA patterns compile"));

/// Compiled classification table.
#[derive(Debug, Clone)]
pub struct UaClassifier {
    rules: Vec<(Regex, UserAgentClass)>,
}

impl UaClassifier {
    /// Compile a rule table.
    ///
    /// # Errors
    /// `ConfigError` if a pattern does not compile or a rule carries a class
    /// other than `SocialPreview` or `Bot`.
    pub fn new(rules: &[UaRule]) -> Result<Self, GateError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !matches!(
                rule.class,
                UserAgentClass::SocialPreview | UserAgentClass::Bot
            ) {
                return Err(GateError::ConfigError(format!(
                    "UA rule class must be SocialPreview or Bot, got {:?}",
                    rule.class
                )));
            }
            let regex = RegexBuilder::new(rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    GateError::ConfigError(format!("Invalid UA pattern {}: {}", rule.pattern, e))
                })?;
            compiled.push((regex, rule.class));
        }
        Ok(Self { rules: compiled })
    }

    /// The shared classifier built from [`STANDARD_RULES`].
    pub fn standard() -> &'static UaClassifier {
        &STANDARD
    }

    /// Classify using the whole table: first matching rule wins, then the
    /// length check, then `Ordinary`.
    pub fn classify(&self, user_agent: &str) -> UserAgentClass {
        self.classify_where(user_agent, |_| true)
    }

    /// Classify ignoring social-preview rules.
    ///
    /// Never returns `SocialPreview`. A preview crawler whose UA also looks
    /// like a bot comes back as `Bot`.
    pub fn classify_automated(&self, user_agent: &str) -> UserAgentClass {
        self.classify_where(user_agent, |class| class != UserAgentClass::SocialPreview)
    }

    /// Whether any social-preview rule matches.
    pub fn is_social_preview(&self, user_agent: &str) -> bool {
        self.rules
            .iter()
            .any(|(re, class)| *class == UserAgentClass::SocialPreview && re.is_match(user_agent))
    }

    fn classify_where<F>(&self, user_agent: &str, include: F) -> UserAgentClass
    where
        F: Fn(UserAgentClass) -> bool,
    {
        if let Some((_, class)) = self
            .rules
            .iter()
            .filter(|(_, class)| include(*class))
            .find(|(re, _)| re.is_match(user_agent))
        {
            return *class;
        }

        // Length in UTF-16 code units, as browsers and edge runtimes count it.
        if user_agent.encode_utf16().count() < MIN_USER_AGENT_LEN {
            return UserAgentClass::Suspicious;
        }

        UserAgentClass::Ordinary
    }
}

/// Classify with the standard table.
pub fn classify_user_agent(user_agent: &str) -> UserAgentClass {
    UaClassifier::standard().classify(user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_social_preview_agents() {
        for ua in [
            "Twitterbot/1.0",
            "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)",
            "LinkedInBot/1.0 (compatible; Mozilla/5.0)",
            "Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)",
            "TelegramBot (like TwitterBot)",
            "WhatsApp/2.23.20.0",
            "Mozilla/5.0 (compatible; Discordbot/2.0; +https://discordapp.com)",
            "Mozilla/5.0 (compatible; redditbot/1.0)",
        ] {
            assert_eq!(classify_user_agent(ua), UserAgentClass::SocialPreview, "{}", ua);
        }
    }

    #[test]
    fn test_bot_agents() {
        for ua in [
            "Mozilla/5.0 (compatible; Googlebot/2.1)",
            "python-requests/2.31",
            "curl/8.4.0",
            "Wget/1.21.4",
            "Scrapy/2.11 (+https://scrapy.org)",
            "Go-http-client/1.1",
            "Java/17.0.2",
            "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.0)",
            "ClaudeBot/1.0; +claudebot@anthropic.com",
            "CCBot/2.0 (https://commoncrawl.org/faq/)",
            "Mozilla/5.0 (compatible; Bytespider; spider-feedback@bytedance.com)",
            "Apache-HttpClient/4.5.13 (Java/17)",
        ] {
            assert_eq!(classify_user_agent(ua), UserAgentClass::Bot, "{}", ua);
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify_user_agent("SOME-CRAWLER/1.0 x"), UserAgentClass::Bot);
        assert_eq!(
            classify_user_agent("FACEBOOKEXTERNALHIT/1.1"),
            UserAgentClass::SocialPreview
        );
    }

    #[test]
    fn test_short_or_empty_is_suspicious() {
        assert_eq!(classify_user_agent(""), UserAgentClass::Suspicious);
        assert_eq!(classify_user_agent("Mozilla"), UserAgentClass::Suspicious);
        assert_eq!(classify_user_agent("123456789"), UserAgentClass::Suspicious);
        assert_eq!(classify_user_agent("1234567890"), UserAgentClass::Ordinary);
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // Five astral characters are ten UTF-16 units.
        assert_eq!(classify_user_agent("\u{1F600}".repeat(5).as_str()), UserAgentClass::Ordinary);
        assert_eq!(classify_user_agent("\u{1F600}".repeat(4).as_str()), UserAgentClass::Suspicious);
        // Nine BMP characters stay short.
        assert_eq!(classify_user_agent("caf\u{e9}phone"), UserAgentClass::Suspicious);
    }

    #[test]
    fn test_browser_is_ordinary() {
        assert_eq!(classify_user_agent(CHROME), UserAgentClass::Ordinary);
    }

    #[test]
    fn test_automated_skips_preview_rules() {
        let classifier = UaClassifier::standard();
        // Matches both tables.
        assert_eq!(classifier.classify("Twitterbot/1.0"), UserAgentClass::SocialPreview);
        assert_eq!(classifier.classify_automated("Twitterbot/1.0"), UserAgentClass::Bot);
        // Preview-only signature is not a generic bot.
        let fb = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";
        assert_eq!(classifier.classify_automated(fb), UserAgentClass::Ordinary);
        assert_eq!(classifier.classify_automated("WhatsApp"), UserAgentClass::Suspicious);
    }

    #[test]
    fn test_is_social_preview() {
        let classifier = UaClassifier::standard();
        assert!(classifier.is_social_preview("Slackbot 1.0"));
        assert!(!classifier.is_social_preview(CHROME));
    }

    #[test]
    fn test_custom_rules_are_ordered() {
        let classifier = UaClassifier::new(&[
            UaRule {
                pattern: "acmebot",
                class: UserAgentClass::Bot,
            },
            UaRule {
                pattern: "acme",
                class: UserAgentClass::SocialPreview,
            },
        ])
        .unwrap();
        assert_eq!(classifier.classify("AcmeBot/3.0 (x)"), UserAgentClass::Bot);
        assert_eq!(classifier.classify("Acme-Unfurl/3.0"), UserAgentClass::SocialPreview);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = UaClassifier::new(&[UaRule {
            pattern: "(unclosed",
            class: UserAgentClass::Bot,
        }]);
        assert!(matches!(result, Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_non_matching_class_rejected() {
        let result = UaClassifier::new(&[UaRule {
            pattern: "x",
            class: UserAgentClass::Suspicious,
        }]);
        assert!(matches!(result, Err(GateError::ConfigError(_))));
    }
}
