//! Terraform front-end.
//!
//! Files are parsed with `hcl-edit`, which keeps byte spans for every
//! structure and expression, so each block and attribute gets an exact line
//! range. Expressions that are not plain literals are handed to `hcl-rs`'s
//! evaluator with a context made of the module's `variable` defaults and
//! `locals`. Whatever still cannot be evaluated is kept as a reference or as
//! raw expression text.

use crate::document::{AttrValue, Attribute, Block, Child, Document};
use crate::error::{RampartError, Result};
use crate::parser::lines::LineIndex;
use crate::parser::{Parser, SourceFile};
use crate::provenance::Metadata;
use crate::types::SourceFormat;

use hcl::eval::{Context, Evaluate};
use hcl_edit::expr::{Expression, ObjectKey};
use hcl_edit::structure::{Body, Structure};
use hcl_edit::Span;
use std::path::Path;

/// Passes over `locals` so that locals referring to other locals resolve.
const LOCALS_PASSES: usize = 3;

/// HCL parser for Terraform/OpenTofu modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct HclParser;

/// Outcome of parsing one module directory.
#[derive(Debug)]
pub struct ModuleParse {
    /// The module, absent when no file in it could be parsed
    pub document: Option<Document>,
    /// One error per file that failed to parse
    pub errors: Vec<RampartError>,
}

struct ParsedFile<'a> {
    source: &'a SourceFile,
    body: Body,
}

impl HclParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parse every file of one module into a single document.
    ///
    /// A file with a syntax error is left out and reported; the remaining
    /// files still form the module.
    #[must_use]
    pub fn parse_module(&self, dir: &Path, files: &[SourceFile]) -> ModuleParse {
        let mut errors = Vec::new();
        let mut parsed = Vec::with_capacity(files.len());

        for source in files {
            match parse_body(source) {
                Ok(body) => parsed.push(ParsedFile { source, body }),
                Err(e) => {
                    tracing::warn!(file = %source.path.display(), error = %e, "Skipping unparseable Terraform file");
                    errors.push(e);
                }
            }
        }

        if parsed.is_empty() {
            return ModuleParse {
                document: None,
                errors,
            };
        }

        let context = build_context(&parsed);
        let mut blocks = Vec::new();
        for file in &parsed {
            let converter = Converter::new(file.source, &context);
            blocks.extend(converter.convert_body(&file.body));
        }

        tracing::debug!(
            module = %dir.display(),
            files = parsed.len(),
            blocks = blocks.len(),
            "Parsed Terraform module"
        );

        ModuleParse {
            document: Some(Document::new(SourceFormat::Terraform, dir, blocks)),
            errors,
        }
    }
}

impl Parser for HclParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Terraform
    }

    fn parse_content(&self, content: &str, file_path: &Path) -> Result<Document> {
        let source = SourceFile::new(file_path, content);
        let dir = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut module = self.parse_module(dir, std::slice::from_ref(&source));
        match module.document {
            Some(document) => Ok(document),
            None => Err(module.errors.pop().unwrap_or_else(|| {
                crate::err!(HclParse {
                    file: file_path.to_path_buf(),
                    message: "empty module".to_string(),
                })
            })),
        }
    }
}

fn parse_body(source: &SourceFile) -> Result<Body> {
    hcl_edit::parser::parse_body(&source.content).map_err(|e| {
        crate::err!(HclParse {
            file: source.path.clone(),
            message: e.to_string(),
        })
    })
}

/// Evaluation context with `var.*` from variable defaults and `local.*`
/// from locals.
fn build_context(files: &[ParsedFile<'_>]) -> Context<'static> {
    let empty = Context::new();
    let mut variables = hcl::Map::new();

    for file in files {
        for block in file.body.iter().filter_map(Structure::as_block) {
            if block.ident.as_str() != "variable" {
                continue;
            }
            let Some(name) = block.labels.first().map(|label| label.as_str().to_string()) else {
                continue;
            };
            let default = block
                .body
                .iter()
                .filter_map(Structure::as_attribute)
                .find(|attr| attr.key.as_str() == "default");
            if let Some(default) = default {
                if let Ok(value) = hcl::Expression::from(default.value.clone()).evaluate(&empty) {
                    variables.insert(name, value);
                }
            }
        }
    }

    let mut context = Context::new();
    context.declare_var("var", hcl::Value::Object(variables));

    let mut locals = hcl::Map::new();
    for _ in 0..LOCALS_PASSES {
        let before = locals.len();
        for file in files {
            let attributes = file
                .body
                .iter()
                .filter_map(Structure::as_block)
                .filter(|block| block.ident.as_str() == "locals")
                .flat_map(|block| block.body.iter().filter_map(Structure::as_attribute));
            for attr in attributes {
                let name = attr.key.as_str();
                if locals.contains_key(name) {
                    continue;
                }
                if let Ok(value) = hcl::Expression::from(attr.value.clone()).evaluate(&context) {
                    locals.insert(name.to_string(), value);
                }
            }
        }
        context.declare_var("local", hcl::Value::Object(locals.clone()));
        if locals.len() == before {
            break;
        }
    }

    context
}

struct Converter<'a> {
    source: &'a str,
    lines: LineIndex,
    context: &'a Context<'static>,
}

impl<'a> Converter<'a> {
    fn new(file: &'a SourceFile, context: &'a Context<'static>) -> Self {
        Self {
            source: &file.content,
            lines: LineIndex::new(file.path.to_string_lossy().into_owned(), &file.content),
            context,
        }
    }

    fn metadata(&self, span: Option<std::ops::Range<usize>>, reference: String) -> Metadata {
        let range = span.map_or_else(|| self.lines.file_range(), |span| self.lines.range(self.source, span));
        Metadata::new(range, reference)
    }

    fn convert_body(&self, body: &Body) -> Vec<Block> {
        body.iter()
            .filter_map(Structure::as_block)
            .map(|block| {
                let labels: Vec<String> = block.labels.iter().map(|l| l.as_str().to_string()).collect();
                let kind = block.ident.as_str();
                let reference = match kind {
                    crate::document::RESOURCE => labels.join("."),
                    _ => std::iter::once(kind.to_string()).chain(labels.iter().cloned()).collect::<Vec<_>>().join("."),
                };
                self.convert_block(block, labels, reference)
            })
            .collect()
    }

    fn convert_block(&self, block: &hcl_edit::structure::Block, labels: Vec<String>, reference: String) -> Block {
        let metadata = self.metadata(block.span(), reference);
        let children = block
            .body
            .iter()
            .map(|structure| match structure {
                Structure::Attribute(attr) => {
                    let name = attr.key.as_str();
                    Child::Attribute(Attribute::new(
                        name,
                        self.convert_expression(&attr.value),
                        self.metadata(attr.span(), metadata.child(name).reference().to_string()),
                    ))
                }
                Structure::Block(nested) => {
                    let kind = nested.ident.as_str();
                    let nested_labels = nested.labels.iter().map(|l| l.as_str().to_string()).collect();
                    Child::Block(self.convert_block(nested, nested_labels, metadata.child(kind).reference().to_string()))
                }
            })
            .collect();

        Block::new(block.ident.as_str(), labels, children, metadata)
    }

    fn convert_expression(&self, expr: &Expression) -> AttrValue {
        match expr {
            Expression::Null(_) => AttrValue::Null,
            Expression::Bool(b) => AttrValue::Bool(*b.value()),
            Expression::Number(n) => n.value().as_f64().map_or(AttrValue::Null, AttrValue::Number),
            Expression::String(s) => AttrValue::String(s.value().clone()),
            Expression::Array(array) => AttrValue::List(array.iter().map(|item| self.convert_expression(item)).collect()),
            Expression::Object(object) => AttrValue::Map(
                object
                    .iter()
                    .map(|(key, value)| (self.object_key(key), self.convert_expression(value.expr())))
                    .collect(),
            ),
            other => self.evaluate(other),
        }
    }

    fn object_key(&self, key: &ObjectKey) -> String {
        match key {
            ObjectKey::Ident(ident) => ident.as_str().to_string(),
            ObjectKey::Expression(expr) => match self.convert_expression(expr) {
                AttrValue::String(s) => s,
                _ => self.text_of(expr),
            },
        }
    }

    fn evaluate(&self, expr: &Expression) -> AttrValue {
        match hcl::Expression::from(expr.clone()).evaluate(self.context) {
            Ok(value) => from_hcl_value(value),
            Err(e) => {
                tracing::trace!(expression = %self.text_of(expr), error = %e, "Expression left unevaluated");
                match expr {
                    Expression::Traversal(_) | Expression::Variable(_) => AttrValue::Reference(self.text_of(expr)),
                    Expression::Parenthesis(inner) => match self.evaluate(inner.inner()) {
                        AttrValue::Reference(r) => AttrValue::Reference(r),
                        _ => AttrValue::Expression(self.text_of(expr)),
                    },
                    _ => AttrValue::Expression(self.text_of(expr)),
                }
            }
        }
    }

    fn text_of(&self, expr: &Expression) -> String {
        expr.span()
            .and_then(|span| self.source.get(span))
            .map_or_else(|| expr.to_string(), str::to_string)
            .trim()
            .to_string()
    }
}

fn from_hcl_value(value: hcl::Value) -> AttrValue {
    match value {
        hcl::Value::Null => AttrValue::Null,
        hcl::Value::Bool(b) => AttrValue::Bool(b),
        hcl::Value::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
        hcl::Value::String(s) => AttrValue::String(s),
        hcl::Value::Array(items) => AttrValue::List(items.into_iter().map(from_hcl_value).collect()),
        hcl::Value::Object(entries) => {
            AttrValue::Map(entries.into_iter().map(|(k, v)| (k, from_hcl_value(v))).collect())
        }
    }
}
