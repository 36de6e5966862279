//! Fixed user-facing strings, localized per [`Language`].

use crate::types::{Language, Variant};

const FAQ_PT: &[&str] = &[
    "Quais soluções de IA a VASSTOS oferece?",
    "Como a VASSTOS ajuda na transformação digital?",
    "Como entrar em contato com o suporte?",
    "A VASSTOS faz desenvolvimento sob medida?",
    "Integração de APIs e Automação",
];

const FAQ_EN: &[&str] = &[
    "What AI solutions does VASSTOS offer?",
    "How does VASSTOS help with digital transformation?",
    "How do I contact support?",
    "Does VASSTOS build custom software?",
    "API Integration and Automation",
];

/// Greeting that opens every conversation.
pub fn welcome(language: Language, variant: Variant) -> &'static str {
    match (variant, language) {
        (Variant::KnowledgeBase, Language::Pt) => {
            "Bem-vindo ao Centro de Conhecimento VASSTOS. Sou seu especialista em inovação digital. Como posso potencializar seu negócio hoje?"
        }
        (Variant::KnowledgeBase, Language::En) => {
            "Welcome to the VASSTOS Knowledge Center. I am your digital innovation specialist. How can I boost your business today?"
        }
        (Variant::Concierge, Language::Pt) => {
            "Olá! Sou o concierge digital da VASSTOS. Conte o que você precisa e eu indico a solução certa."
        }
        (Variant::Concierge, Language::En) => {
            "Hi! I am the VASSTOS digital concierge. Tell me what you need and I will point you to the right solution."
        }
        (Variant::Support, Language::Pt) => {
            "Olá! Você está no suporte VASSTOS. Descreva sua dúvida ou problema e vamos resolver juntos."
        }
        (Variant::Support, Language::En) => {
            "Hello! You have reached VASSTOS support. Describe your question or issue and we will solve it together."
        }
    }
}

/// Shown in place of a reply when the reply call fails.
pub fn reply_error(language: Language) -> &'static str {
    match language {
        Language::Pt => {
            "Tive uma instabilidade ao acessar a base de conhecimento. Poderia repetir a pergunta?"
        }
        Language::En => {
            "I had trouble reaching the knowledge base. Could you repeat the question?"
        }
    }
}

/// Used when the upstream call succeeds but returns no text.
pub fn empty_reply(language: Language) -> &'static str {
    match language {
        Language::Pt => {
            "Desculpe, ocorreu um erro ao processar sua resposta na base de conhecimento."
        }
        Language::En => "Sorry, something went wrong while processing your answer.",
    }
}

/// Title given to citations that arrive without one.
pub fn source_placeholder(language: Language) -> &'static str {
    match language {
        Language::Pt => "Base de Conhecimento",
        Language::En => "Knowledge Base",
    }
}

/// Wraps reply text in the tone instruction sent to the speech model.
pub fn speech_prompt(language: Language, text: &str) -> String {
    match language {
        Language::Pt => format!("Diga com clareza e autoridade: {}", text),
        Language::En => format!("Say clearly and with authority: {}", text),
    }
}

/// Suggestion chips offered before the model proposes any.
pub fn default_suggestions(language: Language) -> Vec<String> {
    let set = match language {
        Language::Pt => FAQ_PT,
        Language::En => FAQ_EN,
    };
    set.iter().map(|s| s.to_string()).collect()
}
