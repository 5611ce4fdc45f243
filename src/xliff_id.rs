//! Structural decoding of trans-unit ids.
//!
//! An id such as `Table 123 - Field 456 - Property 789` names a path through
//! the application's object model. The generator note carries the same path
//! with names instead of numbers (`Table Customer - Field Name - Property Caption`).

/// One step of an id path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XliffIdToken {
    /// Element type, e.g. `Table`, `Property`, `NamedType`.
    pub token_type: String,
    /// Name taken from the generator note, quotes removed.
    pub name: String,
    pub level: usize,
}

impl XliffIdToken {
    /// Splits `id` into typed tokens and pairs them with names from `note`.
    pub fn parse(id: &str, note: &str) -> Vec<XliffIdToken> {
        let types: Vec<&str> = id
            .split(' ')
            .filter(|part| !part.is_empty() && *part != "-")
            .filter(|part| !part.chars().all(|c| c.is_ascii_digit()))
            .collect();

        let mut rest = note;
        let mut tokens = Vec::with_capacity(types.len());
        for (level, token_type) in types.iter().enumerate() {
            let name_start = token_type.len() + 1;
            let name = match types.get(level + 1) {
                Some(next) => {
                    let separator = format!(" - {}", next);
                    match rest.find(&separator) {
                        Some(pos) => {
                            let name = rest.get(name_start..pos).unwrap_or("");
                            rest = &rest[pos + 3..];
                            name
                        }
                        None => rest.get(name_start..).unwrap_or(""),
                    }
                }
                None => rest.get(name_start..).unwrap_or(""),
            };
            tokens.push(XliffIdToken {
                token_type: token_type.to_string(),
                name: unquote(name).to_string(),
                level,
            });
        }
        tokens
    }

    /// Role of a unit whose id ends in this token.
    pub fn role(&self) -> String {
        match self.token_type.as_str() {
            "Property" => self.name.clone(),
            "NamedType" => "Label".to_string(),
            other => other.to_string(),
        }
    }
}

fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
}

/// What kind of text a unit holds, as far as validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Comma-separated option captions.
    OptionList,
    /// Free text that may carry placeholders.
    Label,
    Other,
}

impl UnitKind {
    pub fn from_tokens(tokens: &[XliffIdToken]) -> Self {
        match tokens.last() {
            Some(last) if last.token_type == "Property" && last.name == "OptionCaption" => {
                UnitKind::OptionList
            }
            Some(last) if last.token_type == "NamedType" => UnitKind::Label,
            _ => UnitKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_tokens() {
        let tokens = XliffIdToken::parse(
            "Table 2328808854 - Field 1296262074 - Property 2879900210",
            "Table NAB Test Table - Field My Field - Property Caption",
        );
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token_type, "Table");
        assert_eq!(tokens[0].name, "NAB Test Table");
        assert_eq!(tokens[1].name, "My Field");
        assert_eq!(tokens[2].token_type, "Property");
        assert_eq!(tokens[2].name, "Caption");
        assert_eq!(tokens[2].level, 2);
        assert_eq!(tokens[2].role(), "Caption");
        assert_eq!(UnitKind::from_tokens(&tokens), UnitKind::Other);
    }

    #[test]
    fn test_option_caption_kind() {
        let tokens = XliffIdToken::parse(
            "Table 596208023 - Field 1296262074 - Property 62802879",
            "Table Customer - Field Blocked - Property OptionCaption",
        );
        assert_eq!(UnitKind::from_tokens(&tokens), UnitKind::OptionList);
    }

    #[test]
    fn test_named_type_is_label() {
        let tokens = XliffIdToken::parse(
            "Codeunit 456387620 - NamedType 2350589126",
            "Codeunit \"My Codeunit\" - NamedType ErrorLbl",
        );
        assert_eq!(tokens[0].name, "My Codeunit");
        assert_eq!(tokens[1].name, "ErrorLbl");
        assert_eq!(tokens[1].role(), "Label");
        assert_eq!(UnitKind::from_tokens(&tokens), UnitKind::Label);
    }

    #[test]
    fn test_short_note_does_not_panic() {
        let tokens = XliffIdToken::parse("Page 1 - Control 2 - Property 3", "P");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.name.is_empty()));
    }
}
