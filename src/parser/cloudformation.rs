//! CloudFormation and SAM front-end.
//!
//! Templates are read with `serde_yaml` (JSON templates go through
//! `serde_json` first) and mapped onto the generic tree:
//!
//! - each entry of `Resources` becomes a `resource` block labelled
//!   `[Type, LogicalId]`,
//! - nested mappings become nested blocks and lists of mappings become
//!   repeated blocks of the same kind,
//! - scalars and scalar lists become attributes,
//! - intrinsic functions become references or expression text, except a
//!   `Ref` to a parameter with a `Default`, which resolves to that default.

use crate::document::{AttrValue, Attribute, Block, Child, Document, RESOURCE};
use crate::error::Result;
use crate::parser::lines::LineIndex;
use crate::parser::locator::Locator;
use crate::parser::Parser;
use crate::provenance::Metadata;
use crate::types::SourceFormat;

use regex::Regex;
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static TOP_LEVEL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(?:AWSTemplateFormatVersion|Resources)\s*:|^\s*\{?\s*"(?:AWSTemplateFormatVersion|Resources)"\s*:"#)
        .expect("Invalid regex")
});

static DOCUMENT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---\s*$").expect("Invalid regex"));

/// Block kind for entries of the `Parameters` section.
pub const PARAMETER: &str = "parameter";

const FN_PREFIX: &str = "Fn::";

/// Parser for CloudFormation/SAM templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudFormationParser;

impl CloudFormationParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse a file that may or may not be a template.
    ///
    /// Returns `Ok(None)` for well-formed YAML/JSON that is not a template,
    /// so that unrelated configuration files are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `TemplateParse` when the content is not valid YAML/JSON.
    pub fn parse_template(&self, content: &str, file_path: &Path) -> Result<Option<Document>> {
        let root = load(content, file_path)?;
        if !is_template(&root) {
            tracing::debug!(file = %file_path.display(), "Not a CloudFormation template");
            return Ok(None);
        }

        let filename = file_path.to_string_lossy().into_owned();
        let locator = Locator::new(LineIndex::new(filename, content), content);
        let template = Template::new(&root, locator);
        let blocks = template.blocks(&root);

        tracing::debug!(file = %file_path.display(), blocks = blocks.len(), "Parsed CloudFormation template");
        Ok(Some(Document::new(SourceFormat::CloudFormation, file_path, blocks)))
    }

    /// Cheap check used during discovery before a full parse: a single
    /// document with a top-level `AWSTemplateFormatVersion` or `Resources`
    /// key. Files failing it are skipped without a diagnostic.
    #[must_use]
    pub fn looks_like_template(content: &str) -> bool {
        let body = content.trim_start().strip_prefix("---").unwrap_or(content);
        if DOCUMENT_SEPARATOR.is_match(body) {
            return false;
        }
        TOP_LEVEL_KEY.is_match(body)
    }
}

impl Parser for CloudFormationParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::CloudFormation
    }

    fn parse_content(&self, content: &str, file_path: &Path) -> Result<Document> {
        self.parse_template(content, file_path)?.ok_or_else(|| {
            crate::err!(TemplateParse {
                file: file_path.to_path_buf(),
                message: "not a CloudFormation template".to_string(),
                line: None,
            })
        })
    }
}

fn load(content: &str, file_path: &Path) -> Result<Yaml> {
    let is_json = file_path.extension().is_some_and(|ext| ext == "json") || content.trim_start().starts_with('{');
    if is_json {
        let json: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            crate::err!(TemplateParse {
                file: file_path.to_path_buf(),
                message: e.to_string(),
                line: Some(e.line()),
            })
        })?;
        return serde_yaml::to_value(json).map_err(|e| {
            crate::err!(TemplateParse {
                file: file_path.to_path_buf(),
                message: e.to_string(),
                line: None,
            })
        });
    }

    serde_yaml::from_str(content).map_err(|e| {
        crate::err!(TemplateParse {
            file: file_path.to_path_buf(),
            message: e.to_string(),
            line: e.location().map(|location| location.line()),
        })
    })
}

fn is_template(root: &Yaml) -> bool {
    let Some(root) = root.as_mapping() else {
        return false;
    };
    if root.contains_key("AWSTemplateFormatVersion") {
        return true;
    }
    root.get("Resources")
        .and_then(Yaml::as_mapping)
        .is_some_and(|resources| {
            resources
                .values()
                .any(|resource| resource.as_mapping().is_some_and(|r| r.contains_key("Type")))
        })
}

struct Template {
    locator: Locator,
    parameters: HashMap<String, AttrValue>,
}

impl Template {
    fn new(root: &Yaml, locator: Locator) -> Self {
        let mut template = Self {
            locator,
            parameters: HashMap::new(),
        };
        let defaults: HashMap<String, AttrValue> = section(root, "Parameters")
            .filter_map(|(name, parameter)| {
                let default = parameter.as_mapping()?.get("Default")?;
                Some((name, template.convert_value(default)))
            })
            .collect();
        template.parameters = defaults;
        template
    }

    fn blocks(&self, root: &Yaml) -> Vec<Block> {
        let parameters = section(root, "Parameters").filter_map(|(name, parameter)| {
            let mapping = parameter.as_mapping()?;
            let path = vec!["Parameters".to_string(), name.clone()];
            Some(Block::new(PARAMETER, vec![name], self.children(mapping, &path), self.metadata(&path)))
        });

        let resources = section(root, "Resources").filter_map(|(logical_id, resource)| {
            let mapping = resource.as_mapping()?;
            let resource_type = mapping.get("Type").and_then(Yaml::as_str).unwrap_or_default().to_string();
            let path = vec!["Resources".to_string(), logical_id.clone()];
            Some(Block::new(
                RESOURCE,
                vec![resource_type, logical_id],
                self.children(mapping, &path),
                self.metadata(&path),
            ))
        });

        parameters.chain(resources).collect()
    }

    fn metadata(&self, path: &[String]) -> Metadata {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        Metadata::new(self.locator.range(&segments), path.join("."))
    }

    fn children(&self, mapping: &Mapping, path: &[String]) -> Vec<Child> {
        let mut children = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key_to_string(key);
            let child_path = extend(path, &name);

            if let Some(nested) = value.as_mapping().filter(|m| intrinsic(m).is_none()) {
                children.push(Child::Block(Block::new(
                    name,
                    Vec::new(),
                    self.children(nested, &child_path),
                    self.metadata(&child_path),
                )));
                continue;
            }

            if let Some(items) = repeated_blocks(value) {
                for (index, item) in items.into_iter().enumerate() {
                    let item_path = extend(&child_path, &index.to_string());
                    children.push(Child::Block(Block::new(
                        name.clone(),
                        Vec::new(),
                        self.children(item, &item_path),
                        self.metadata(&item_path),
                    )));
                }
                continue;
            }

            children.push(Child::Attribute(Attribute::new(
                name,
                self.convert_value(value),
                self.metadata(&child_path),
            )));
        }
        children
    }

    fn convert_value(&self, value: &Yaml) -> AttrValue {
        match value {
            Yaml::Null => AttrValue::Null,
            Yaml::Bool(b) => AttrValue::Bool(*b),
            Yaml::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
            Yaml::String(s) => AttrValue::String(s.clone()),
            Yaml::Sequence(items) => AttrValue::List(items.iter().map(|item| self.convert_value(item)).collect()),
            Yaml::Mapping(mapping) => match intrinsic(mapping) {
                Some((function, argument)) => self.convert_intrinsic(function, argument),
                None => AttrValue::Map(
                    mapping
                        .iter()
                        .map(|(k, v)| (key_to_string(k), self.convert_value(v)))
                        .collect(),
                ),
            },
            Yaml::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                self.convert_intrinsic(tag.trim_start_matches('!'), &tagged.value)
            }
        }
    }

    fn convert_intrinsic(&self, function: &str, argument: &Yaml) -> AttrValue {
        let function = function.strip_prefix(FN_PREFIX).unwrap_or(function);
        match function {
            "Ref" => match argument.as_str() {
                Some(name) if self.parameters.contains_key(name) => self.parameters[name].clone(),
                Some(name) if !name.starts_with("AWS::") => AttrValue::Reference(name.to_string()),
                _ => AttrValue::Expression(render(function, argument)),
            },
            "GetAtt" => match argument {
                Yaml::String(target) => AttrValue::Reference(target.clone()),
                Yaml::Sequence(parts) => {
                    let parts: Vec<&str> = parts.iter().filter_map(Yaml::as_str).collect();
                    AttrValue::Reference(parts.join("."))
                }
                _ => AttrValue::Expression(render(function, argument)),
            },
            "Sub" => argument
                .as_str()
                .and_then(|template| self.substitute(template))
                .map_or_else(|| AttrValue::Expression(render(function, argument)), AttrValue::String),
            "Join" => self
                .join(argument)
                .map_or_else(|| AttrValue::Expression(render(function, argument)), AttrValue::String),
            _ => AttrValue::Expression(render(function, argument)),
        }
    }

    /// `!Sub` with only parameter placeholders that have defaults.
    fn substitute(&self, template: &str) -> Option<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}')?;
            let name = &after[..end];
            if let Some(literal) = name.strip_prefix('!') {
                out.push_str("${");
                out.push_str(literal);
                out.push('}');
            } else {
                out.push_str(&self.parameters.get(name)?.as_string()?);
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    fn join(&self, argument: &Yaml) -> Option<String> {
        let parts = argument.as_sequence()?;
        let delimiter = parts.first()?.as_str()?;
        let AttrValue::List(items) = self.convert_value(parts.get(1)?) else {
            return None;
        };
        let items: Option<Vec<String>> = items.iter().map(AttrValue::as_string).collect();
        Some(items?.join(delimiter))
    }
}

/// `(name, value)` entries of a top-level section, in template order.
fn section<'a>(root: &'a Yaml, name: &str) -> impl Iterator<Item = (String, &'a Yaml)> + 'a {
    root.get(name)
        .and_then(Yaml::as_mapping)
        .into_iter()
        .flat_map(|mapping| mapping.iter().map(|(k, v)| (key_to_string(k), v)))
}

/// A long-form intrinsic: a single-key mapping `Ref` or `Fn::*`.
fn intrinsic(mapping: &Mapping) -> Option<(&str, &Yaml)> {
    if mapping.len() != 1 {
        return None;
    }
    let (key, value) = mapping.iter().next()?;
    let key = key.as_str()?;
    (key == "Ref" || key.starts_with(FN_PREFIX)).then_some((key, value))
}

/// A non-empty list whose items are all plain mappings.
fn repeated_blocks(value: &Yaml) -> Option<Vec<&Mapping>> {
    let items = value.as_sequence().filter(|items| !items.is_empty())?;
    items
        .iter()
        .map(|item| item.as_mapping().filter(|m| intrinsic(m).is_none()))
        .collect()
}

fn key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
    }
}

fn render(function: &str, argument: &Yaml) -> String {
    let argument = serde_json::to_string(argument).unwrap_or_default();
    format!("!{function} {argument}")
}

fn extend(path: &[String], segment: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(segment.to_string());
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::HasMetadata;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Parameters:
  BucketName:
    Type: String
    Default: my-logs
Resources:
  Logs:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: !Ref BucketName
      AccessControl: Private
      LoggingConfiguration:
        DestinationBucketName: !Ref Target
      BucketEncryption:
        ServerSideEncryptionConfiguration:
          - ServerSideEncryptionByDefault:
              SSEAlgorithm: aws:kms
      Tags:
        - Key: name
          Value: !Sub "${BucketName}-tag"
  Api:
    Type: AWS::Serverless::Api
    Properties:
      Name: !Join ["-", [api, !Ref BucketName]]
      Arn:
        Fn::GetAtt: [Logs, Arn]
      Region: !Ref AWS::Region
"#;

    fn parse() -> Document {
        CloudFormationParser::new().parse_content(TEMPLATE, Path::new("template.yaml")).unwrap()
    }

    #[test]
    fn test_resources_become_blocks() {
        let doc = parse();
        let bucket = doc.find_resource("AWS::S3::Bucket", "Logs").unwrap();
        assert_eq!(bucket.range().start_line(), 7);
        assert_eq!(bucket.metadata().reference(), "Resources.Logs");

        let acl = bucket.get_nested_attribute("Properties.AccessControl").unwrap();
        assert_eq!(acl.value(), &AttrValue::String("Private".into()));
        assert_eq!(acl.range().start_line(), 11);
        assert_eq!(acl.range().end_line(), 11);
    }

    #[test]
    fn test_lists_of_mappings_become_repeated_blocks() {
        let doc = parse();
        let bucket = doc.find_resource("AWS::S3::Bucket", "Logs").unwrap();
        let encryption = bucket.get_nested_block("Properties.BucketEncryption").unwrap();
        let rules = encryption.get_blocks(Some("ServerSideEncryptionConfiguration"));
        assert_eq!(rules.len(), 1);
        let algorithm = rules[0].get_nested_attribute("ServerSideEncryptionByDefault.SSEAlgorithm").unwrap();
        assert_eq!(algorithm.value(), &AttrValue::String("aws:kms".into()));
        assert_eq!(algorithm.range().start_line(), 17);
    }

    #[test]
    fn test_intrinsics() {
        let doc = parse();
        let bucket = doc.find_resource("AWS::S3::Bucket", "Logs").unwrap();
        let properties = bucket.get_block("Properties").unwrap();
        assert_eq!(properties.get_attribute("BucketName").unwrap().value(), &AttrValue::String("my-logs".into()));
        assert_eq!(
            properties.get_nested_attribute("LoggingConfiguration.DestinationBucketName").unwrap().value(),
            &AttrValue::Reference("Target".into())
        );
        let tags = properties.get_blocks(Some("Tags"));
        assert_eq!(tags[0].get_attribute("Value").unwrap().value(), &AttrValue::String("my-logs-tag".into()));

        let api = doc.find_resource("AWS::Serverless::Api", "Api").unwrap();
        let properties = api.get_block("Properties").unwrap();
        assert_eq!(properties.get_attribute("Name").unwrap().value(), &AttrValue::String("api-my-logs".into()));
        assert_eq!(properties.get_attribute("Arn").unwrap().value(), &AttrValue::Reference("Logs.Arn".into()));
        assert!(matches!(properties.get_attribute("Region").unwrap().value(), AttrValue::Expression(_)));
    }

    #[test]
    fn test_json_template() {
        let json = r#"{
  "Resources": {
    "Db": {
      "Type": "AWS::RDS::DBInstance",
      "Properties": {
        "StorageEncrypted": false
      }
    }
  }
}"#;
        let doc = CloudFormationParser::new().parse_content(json, Path::new("template.json")).unwrap();
        let db = doc.find_resource("AWS::RDS::DBInstance", "Db").unwrap();
        let encrypted = db.get_nested_attribute("Properties.StorageEncrypted").unwrap();
        assert_eq!(encrypted.value(), &AttrValue::Bool(false));
        assert_eq!(encrypted.range().start_line(), 6);
    }

    #[test]
    fn test_non_template_is_skipped() {
        let parser = CloudFormationParser::new();
        assert!(parser.parse_template("scan:\n  max_depth: 3\n", Path::new("rampart.yaml")).unwrap().is_none());
        assert!(parser.parse_content("scan: {}\n", Path::new("rampart.yaml")).is_err());
    }

    #[test_case("AWSTemplateFormatVersion: \"2010-09-09\"\n", true; "version key")]
    #[test_case("---\nResources:\n  Logs: [\n", true; "leading separator broken body")]
    #[test_case("{\n  \"Resources\": {}\n}\n", true; "json")]
    #[test_case("description: Resources for the team\n", false; "word in a value")]
    #[test_case("spec:\n  Resources:\n    cpu: 1\n", false; "nested key")]
    #[test_case("kind: Pod\n---\nResources:\n  a: [\n", false; "multi document")]
    fn test_looks_like_template(content: &str, expected: bool) {
        assert_eq!(CloudFormationParser::looks_like_template(content), expected);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = CloudFormationParser::new().parse_template("Resources: [unclosed", Path::new("bad.yaml"));
        assert!(matches!(result, Err(crate::error::RampartError::TemplateParse { .. })));
    }
}
