use std::collections::HashMap;

use once_cell::sync::Lazy;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::{
    datatypes::{Datatype, OperationContract, StateField, TypeSchema, S32},
    logging::Logging,
};

#[derive(Parser)]
#[grammar = "internals/schema_grammar.pest"]
pub struct SchemaParser;

static DATATYPE_KEYWORDS: Lazy<HashMap<&'static str, Datatype>> = Lazy::new(|| {
    HashMap::from([
        ("void", Datatype::VOID),
        ("bool", Datatype::BOOL),
        ("id", Datatype::IID),
        ("i64", Datatype::I64),
        ("u64", Datatype::U64),
        ("f64", Datatype::F64),
        ("s32", Datatype::S32),
    ])
});

impl SchemaParser {
    fn parse_datatype(v: &str) -> Option<Datatype> {
        DATATYPE_KEYWORDS.get(v.trim()).copied()
    }

    fn check_keywords(name: &str) -> anyhow::Result<()> {
        if name == "virtual" {
            "Keyword 'virtual' can't be used as a type name.".to_error()
        } else if name == "product" {
            "Keyword 'product' can't be used as a type name.".to_error()
        } else {
            Ok(())
        }
    }

    fn parse_field(pair: Pair<'_, Rule>) -> anyhow::Result<StateField> {
        let mut subs = pair.into_inner();
        let name: S32 = subs.next().unwrap().as_str().trim().into();
        let val = subs.next().unwrap();

        match Self::parse_datatype(val.as_str()) {
            Some(datatype) => Ok(StateField { name, datatype }),
            None => format!("Unknown datatype '{}' in field '{}'.", val.as_str(), name).to_error(),
        }
    }

    fn parse_struct(pair: Pair<'_, Rule>) -> anyhow::Result<TypeSchema> {
        let mut pairs = pair.into_inner();
        let name = pairs.next().unwrap().as_str().trim().to_owned();
        Self::check_keywords(&name)?;

        let mut val = pairs.next().unwrap();
        let parent: Option<S32> = if val.as_rule() == Rule::parent_expr {
            let p: S32 = val.as_str().trim().into();
            val = pairs.next().unwrap();
            Some(p)
        } else {
            None
        };

        let fields = val
            .clone()
            .into_inner()
            .find(|p| p.as_rule() == Rule::field_list_expr)
            .map(|list| {
                list.into_inner()
                    .map(Self::parse_field)
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        match val.as_rule() {
            Rule::virtual_body_expr => Ok(TypeSchema::Virtual {
                tag: name.into(),
                parent,
                operations: fields
                    .into_iter()
                    .map(|f| OperationContract {
                        name: f.name,
                        returns: f.datatype,
                    })
                    .collect(),
            }),

            Rule::product_body_expr => Ok(TypeSchema::Record {
                tag: name.into(),
                parent,
                fields,
            }),

            e => format!(
                "Unexpected rule {:?} found where a virtual or product body was expected.",
                e
            )
            .to_error(),
        }
    }

    pub fn parse_type<S: AsRef<str>>(s: S) -> anyhow::Result<TypeSchema> {
        match Self::parse(Rule::struct_expr, s.as_ref()) {
            Ok(pairs) => {
                let pair = pairs.into_iter().next().unwrap();
                match pair.as_rule() {
                    Rule::struct_expr => Self::parse_struct(pair),
                    _ => "Wrong structure found!".to_error(),
                }
            }
            Err(err) => err.to_string().to_error(),
        }
    }

    pub fn parse_types<S: AsRef<str>>(s: S) -> Vec<anyhow::Result<TypeSchema>> {
        match Self::parse(Rule::structures_expr, s.as_ref()) {
            Ok(mut pairs) => pairs
                .next()
                .unwrap()
                .into_inner()
                .filter(|pair| pair.as_rule() == Rule::struct_expr)
                .map(Self::parse_struct)
                .collect(),

            Err(err) => vec![err.to_string().to_error()],
        }
    }

    pub fn parse_all<S: AsRef<str>>(s: S) -> anyhow::Result<Vec<TypeSchema>> {
        let result = Self::parse_types(s);
        if result.iter().all(|x| x.is_ok()) {
            Ok(result.into_iter().map(|x| x.unwrap()).collect())
        } else {
            result
                .into_iter()
                .filter_map(|x| x.err())
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join("; ")
                .to_error()
        }
    }
}

/* /////////////////////////////////////////////////////////////////////////////////// */
/// Unit Tests
/* /////////////////////////////////////////////////////////////////////////////////// */

#[cfg(test)]
mod schema_grammar_testing {
    use crate::internals::datatypes::{Datatype, OperationContract, StateField, TypeSchema, S32};

    use super::SchemaParser;

    #[test]
    fn test_parse_virtual_type() {
        let input = "Shape : virtual { area: f64, describe: s32 };";
        let expected = TypeSchema::Virtual {
            tag: "Shape".into(),
            parent: None,
            operations: vec![
                OperationContract {
                    name: "area".into(),
                    returns: Datatype::F64,
                },
                OperationContract {
                    name: "describe".into(),
                    returns: Datatype::S32,
                },
            ],
        };

        assert_eq!(expected, SchemaParser::parse_type(input).unwrap());
    }

    #[test]
    fn test_parse_record_type_with_parent() {
        let input = "Circle : Shape product { radius: f64 };";
        let expected = TypeSchema::Record {
            tag: "Circle".into(),
            parent: Some("Shape".into()),
            fields: vec![StateField {
                name: "radius".into(),
                datatype: Datatype::F64,
            }],
        };

        assert_eq!(expected, SchemaParser::parse_type(input).unwrap());
    }

    #[test]
    fn test_parse_record_type_without_parent() {
        let input = "Point : product { x: f64, y: f64 };";
        let parsed = SchemaParser::parse_type(input).unwrap();

        assert!(parsed.is_record());
        assert_eq!(S32::from("Point"), parsed.tag());
        assert_eq!(None, parsed.parent());
    }

    #[test]
    fn test_parse_empty_bodies() {
        assert!(SchemaParser::parse_type("Marker : product { };").is_ok());
        assert!(SchemaParser::parse_type("Hook : virtual { };").is_ok());
    }

    #[test]
    fn test_keywords_rejected_as_type_names() {
        assert!(SchemaParser::parse_type("virtual : product { };").is_err());
        assert!(SchemaParser::parse_type("product : virtual { };").is_err());
    }

    #[test]
    fn test_parse_all_with_comments() {
        let input = r#"
            -- contracts first, then the concrete variants
            Shape : virtual { area: f64 };
            Circle : Shape product { radius: f64 };
        "#;

        let parsed = SchemaParser::parse_all(input).unwrap();
        assert_eq!(2, parsed.len());
        assert!(parsed[0].is_virtual());
        assert_eq!(Some("Shape".into()), parsed[1].parent());
    }

    #[test]
    fn test_parse_all_reports_malformed_input() {
        assert!(SchemaParser::parse_all("Shape : virtual { area: f64 }").is_err());
        assert!(SchemaParser::parse_all("Shape virtual { area: f64 };").is_err());
    }
}
