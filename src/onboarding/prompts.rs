//! Assistant prompt text for each onboarding phase.
//!
//! Prompts may embed directive tags (buttons, forms); the assistant runs
//! every outgoing text through the directive parser, so tags emitted here
//! become UI commands in the rendering layer.

use crate::analysis::{AnalysisResult, Strategy};
use crate::lang::Language;
use crate::onboarding::state::OnboardingPhase;

/// The question the assistant asks when the journey is in `phase`.
pub fn phase_prompt(phase: OnboardingPhase, lang: Language) -> String {
    match (phase, lang) {
        (OnboardingPhase::Welcome | OnboardingPhase::GreetingPreference, Language::En) => {
            "Welcome to Morvo! I'm your AI marketing assistant. \
             Before we start — how would you like me to address you?"
                .to_string()
        }
        (OnboardingPhase::Welcome | OnboardingPhase::GreetingPreference, Language::Ar) => {
            "أهلاً بك في مورفو! أنا مساعدك التسويقي الذكي. \
             قبل أن نبدأ — كيف تحب أن أناديك؟"
                .to_string()
        }
        (OnboardingPhase::WebsiteAnalysis, Language::En) => {
            "Great! Share your website address and I'll analyze it to learn \
             about your business. [BUTTON:Skip this step:skip_website]"
                .to_string()
        }
        (OnboardingPhase::WebsiteAnalysis, Language::Ar) => {
            "رائع! شارك معي رابط موقعك وسأحلله للتعرف على نشاطك التجاري. \
             [BUTTON:تخطي هذه الخطوة:skip_website]"
                .to_string()
        }
        (OnboardingPhase::AnalysisReview, Language::En) => {
            "What is the primary goal you want your marketing to achieve?"
                .to_string()
        }
        (OnboardingPhase::AnalysisReview, Language::Ar) => {
            "ما الهدف الأساسي الذي تريد تحقيقه من التسويق؟".to_string()
        }
        (OnboardingPhase::ProfileCompletion, Language::En) => {
            "Let's complete your business profile. \
             [FORM:Business profile:company name,industry,contact email:email,phone:tel,team size:number]"
                .to_string()
        }
        (OnboardingPhase::ProfileCompletion, Language::Ar) => {
            "لنكمل ملف نشاطك التجاري. \
             [FORM:ملف النشاط التجاري:اسم الشركة,المجال,البريد الإلكتروني:email,الهاتف:tel,حجم الفريق:number]"
                .to_string()
        }
        (OnboardingPhase::ProfessionalAnalysis, Language::En) => {
            "What monthly budget do you have in mind for marketing?".to_string()
        }
        (OnboardingPhase::ProfessionalAnalysis, Language::Ar) => {
            "ما الميزانية الشهرية التي تفكر فيها للتسويق؟".to_string()
        }
        (OnboardingPhase::StrategyGeneration, Language::En) => {
            "I have everything I need to draft your marketing strategy. \
             Shall I start? [BUTTON:Yes, start:generate_strategy]"
                .to_string()
        }
        (OnboardingPhase::StrategyGeneration, Language::Ar) => {
            "لدي كل ما أحتاجه لإعداد استراتيجيتك التسويقية. هل أبدأ؟ \
             [BUTTON:نعم، ابدأ:generate_strategy]"
                .to_string()
        }
        (OnboardingPhase::CommitmentActivation, Language::En) => {
            "Your strategy is ready. Reply when you're ready to commit to the \
             plan and activate your workspace."
                .to_string()
        }
        (OnboardingPhase::CommitmentActivation, Language::Ar) => {
            "استراتيجيتك جاهزة. أرسل ردك عندما تكون مستعداً لاعتماد الخطة \
             وتفعيل مساحة عملك."
                .to_string()
        }
        (OnboardingPhase::Completed, Language::En) => {
            "You're all set! Ask me anything about your marketing."
                .to_string()
        }
        (OnboardingPhase::Completed, Language::Ar) => {
            "كل شيء جاهز! اسألني أي شيء عن تسويقك.".to_string()
        }
    }
}

/// Present a website analysis and ask the review question.
pub fn analysis_review_prompt(analysis: &AnalysisResult, lang: Language) -> String {
    let review = phase_prompt(OnboardingPhase::AnalysisReview, lang);
    match lang {
        Language::En => format!(
            "Here's what I learned about {}: {}\n\n{review}",
            analysis.title, analysis.description
        ),
        Language::Ar => format!(
            "إليك ما تعرفت عليه حول {}: {}\n\n{review}",
            analysis.title, analysis.description
        ),
    }
}

/// Present a generated strategy and ask for commitment.
pub fn commitment_prompt(strategy: &Strategy, lang: Language) -> String {
    let commitment = phase_prompt(OnboardingPhase::CommitmentActivation, lang);
    match lang {
        Language::En => format!(
            "{}\n\nRecommended channels: {}.\n\n{commitment}",
            strategy.summary,
            strategy.recommended_channels.join(", ")
        ),
        Language::Ar => format!(
            "{}\n\nالقنوات الموصى بها: {}.\n\n{commitment}",
            strategy.summary,
            strategy.recommended_channels.join("، ")
        ),
    }
}

/// Nudge when the website phase got a message with no recognizable URL.
pub fn need_url_prompt(lang: Language) -> &'static str {
    match lang {
        Language::En => {
            "I couldn't spot a website address in that. Try something like \
             www.yourcompany.com, or skip this step."
        }
        Language::Ar => {
            "لم أتمكن من إيجاد رابط موقع في رسالتك. جرب شيئاً مثل \
             www.yourcompany.com أو تخطَّ هذه الخطوة."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fallback_analysis;
    use crate::directive::{CommandKind, parse};

    #[test]
    fn every_phase_has_a_prompt_in_both_languages() {
        for phase in OnboardingPhase::ALL {
            for lang in [Language::En, Language::Ar] {
                assert!(
                    !phase_prompt(phase, lang).is_empty(),
                    "{phase}/{lang} prompt missing"
                );
            }
        }
    }

    #[test]
    fn website_prompt_carries_skip_button() {
        let parsed = parse(
            &phase_prompt(OnboardingPhase::WebsiteAnalysis, Language::En),
            Language::En,
        );
        assert!(parsed.commands.iter().any(|c| matches!(
            &c.kind,
            CommandKind::Button { action, .. } if action == "skip_website"
        )));
    }

    #[test]
    fn profile_prompt_carries_form() {
        let parsed = parse(
            &phase_prompt(OnboardingPhase::ProfileCompletion, Language::Ar),
            Language::Ar,
        );
        assert!(parsed
            .commands
            .iter()
            .any(|c| matches!(&c.kind, CommandKind::Form { fields, .. } if fields.len() == 5)));
    }

    #[test]
    fn analysis_review_includes_site_details() {
        let analysis = fallback_analysis("https://acme.io");
        let prompt = analysis_review_prompt(&analysis, Language::En);
        assert!(prompt.contains("acme.io"));
        assert!(prompt.contains("primary goal"));
    }
}
