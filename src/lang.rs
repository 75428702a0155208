//! Localization — the product ships English and Arabic surfaces.
//!
//! Kept deliberately small: a `Language` enum plus message functions for
//! the strings the engine itself produces (form placeholders, retry
//! prompts, degraded-mode notices). Phase prompts live in
//! `onboarding::prompts`.

use serde::{Deserialize, Serialize};

/// Active conversation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Default for Language {
    fn default() -> Self {
        Self::Ar
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ar => write!(f, "ar"),
        }
    }
}

impl Language {
    /// Parse a language code, defaulting to Arabic for unknown values.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Self::En,
            _ => Self::Ar,
        }
    }

    /// Auto-derived placeholder for a form field: "Enter <field>".
    pub fn field_placeholder(&self, field_name: &str) -> String {
        match self {
            Self::En => format!("Enter {field_name}"),
            Self::Ar => format!("أدخل {field_name}"),
        }
    }

    /// Prompt shown when a persistence side effect failed and the phase
    /// did not advance.
    pub fn retry_save_prompt(&self) -> &'static str {
        match self {
            Self::En => {
                "I couldn't save that just now. Could you send it again?"
            }
            Self::Ar => "لم أتمكن من حفظ ذلك الآن. هل يمكنك إرساله مرة أخرى؟",
        }
    }

    /// Non-blocking notice that locally synthesized placeholder data is
    /// being shown because the remote call kept failing.
    pub fn degraded_notice(&self) -> &'static str {
        match self {
            Self::En => {
                "(I'm showing estimated results while the analysis service recovers.)"
            }
            Self::Ar => "(أعرض نتائج تقديرية ريثما تعود خدمة التحليل للعمل.)",
        }
    }

    /// Fallback assistant reply when the chat service is unreachable.
    pub fn chat_fallback_reply(&self) -> &'static str {
        match self {
            Self::En => {
                "I'm having trouble reaching the assistant service right now. \
                 Your message wasn't lost — please try again in a moment."
            }
            Self::Ar => {
                "أواجه صعوبة في الوصول إلى خدمة المساعد حالياً. \
                 رسالتك لم تُفقد — حاول مرة أخرى بعد قليل."
            }
        }
    }
}
