//! Prompt templates. Pure formatters over their arguments.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::protocol::RpcError;

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

const fn arg(name: &'static str, description: &'static str, required: bool) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required,
    }
}

pub fn prompt_catalog() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "security_review",
            description: "Review a piece of code for security vulnerabilities",
            arguments: vec![
                arg("code", "Source code to review", true),
                arg("language", "Programming language of the code", false),
                arg("focus", "Area to concentrate on, e.g. injection or auth", false),
            ],
        },
        PromptDefinition {
            name: "threat_model",
            description: "Build a STRIDE threat model for a system",
            arguments: vec![
                arg("system_description", "What the system does and how it is deployed", true),
                arg("components", "Comma-separated list of components", false),
            ],
        },
        PromptDefinition {
            name: "secure_coding",
            description: "Secure coding guidance for a language",
            arguments: vec![
                arg("language", "Target programming language", true),
                arg("topic", "Specific topic, e.g. input validation", false),
            ],
        },
    ]
}

struct PromptArgs<'a>(&'a Map<String, Value>);

impl PromptArgs<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn require(&self, prompt: &str, key: &str) -> Result<&str, RpcError> {
        self.get(key).ok_or_else(|| {
            RpcError::invalid_params(format!(
                "Prompt '{}' requires argument '{}'",
                prompt, key
            ))
        })
    }
}

pub fn get_prompt(name: &str, arguments: &Map<String, Value>) -> Result<Value, RpcError> {
    let args = PromptArgs(arguments);
    let (description, text) = match name {
        "security_review" => security_review(&args)?,
        "threat_model" => threat_model(&args)?,
        "secure_coding" => secure_coding(&args)?,
        other => {
            return Err(RpcError::invalid_params(format!("Unknown prompt: {}", other)));
        }
    };

    Ok(json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text }
        }]
    }))
}

fn security_review(args: &PromptArgs<'_>) -> Result<(String, String), RpcError> {
    let code = args.require("security_review", "code")?;
    let language = args.get("language").unwrap_or("the given language");
    let focus = args
        .get("focus")
        .map(|focus| format!("Pay particular attention to {}.\n", focus))
        .unwrap_or_default();

    let text = format!(
        "Review the following {language} code for security vulnerabilities.\n\
         {focus}\
         For each issue give the severity (critical, high, medium, low or info), \
         the CWE id where one applies, the affected lines and a concrete fix.\n\n\
         ```\n{code}\n```"
    );
    Ok((format!("Security review of {} code", language), text))
}

fn threat_model(args: &PromptArgs<'_>) -> Result<(String, String), RpcError> {
    let system = args.require("threat_model", "system_description")?;
    let components = args
        .get("components")
        .map(|list| {
            let items: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| format!("- {}", c))
                .collect();
            format!("\nComponents:\n{}\n", items.join("\n"))
        })
        .unwrap_or_default();

    let text = format!(
        "Produce a STRIDE threat model for this system.\n\n\
         System:\n{system}\n{components}\n\
         Cover each category in turn: Spoofing, Tampering, Repudiation, \
         Information disclosure, Denial of service and Elevation of privilege. \
         For every threat name the affected component, the likelihood, the impact \
         and a mitigation."
    );
    Ok(("STRIDE threat model".to_string(), text))
}

fn secure_coding(args: &PromptArgs<'_>) -> Result<(String, String), RpcError> {
    let language = args.require("secure_coding", "language")?;
    let text = match args.get("topic") {
        Some(topic) => format!(
            "Explain secure coding practices for {topic} in {language}. \
             Show a vulnerable example, the corrected version, and the standard \
             library or well-known package to rely on."
        ),
        None => format!(
            "Summarise the most important secure coding practices for {language}: \
             input validation, output encoding, authentication, secrets handling, \
             dependency hygiene and error handling. Give a short example for each."
        ),
    };
    Ok((format!("Secure coding guidance for {}", language), text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::INVALID_PARAMS;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn renders_security_review() {
        let prompt = get_prompt(
            "security_review",
            &args(json!({ "code": "eval(input)", "language": "python", "focus": "injection" })),
        )
        .expect("rendered");

        let text = prompt["messages"][0]["content"]["text"].as_str().expect("text");
        assert_eq!(prompt["messages"][0]["role"], "user");
        assert!(text.contains("python code"));
        assert!(text.contains("attention to injection"));
        assert!(text.contains("eval(input)"));
    }

    #[test]
    fn threat_model_lists_components() {
        let prompt = get_prompt(
            "threat_model",
            &args(json!({ "system_description": "Payments API", "components": "gateway, db" })),
        )
        .expect("rendered");
        let text = prompt["messages"][0]["content"]["text"].as_str().expect("text");
        assert!(text.contains("- gateway\n- db"));
        assert!(text.contains("Elevation of privilege"));
    }

    #[test]
    fn missing_required_argument_is_invalid_params() {
        let err = get_prompt("secure_coding", &Map::new()).expect_err("missing");
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("'language'"));

        let err = get_prompt("nope", &Map::new()).expect_err("unknown");
        assert_eq!(err.message, "Unknown prompt: nope");
    }

    #[test]
    fn catalog_marks_required_arguments() {
        let catalog = prompt_catalog();
        assert_eq!(catalog.len(), 3);
        let review = &catalog[0];
        assert!(review.arguments.iter().any(|a| a.name == "code" && a.required));
    }
}
