use crate::error::{Error, Result};
use crate::host::{EngineHost, OutputEncoding};
pub use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case,
        table::to_table_case, train::to_train_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
    suffix::foreign_key::to_foreign_key,
};
use log::warn;
use minijinja::Environment;
use regex::Regex;
use serde_json::json;

/// A preprocessed template artifact: Rust source exposing `transform_text`.
#[derive(Debug)]
pub struct PreprocessedTemplate {
    pub content: String,
}

fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{}': {}", re, err);
            false
        }
    }
}

/// Matches `<#@ output ... #>` directives, including one trailing line break.
fn output_directive_regex() -> Regex {
    Regex::new(r"<#@\s*output\b([^#]*)#>[ \t]*\r?\n?")
        .expect("static output directive pattern")
}

/// Matches `name="value"` attribute pairs inside a directive.
fn directive_attribute_regex() -> Regex {
    Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).expect("static directive attribute pattern")
}

/// Template transformation engine bound to a per-file host.
pub struct Engine<'h> {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Default context that will be merged with any provided context
    default_context: serde_json::Value,
    host: &'h dyn EngineHost,
}

impl<'h> Engine<'h> {
    /// Creates a new engine for one template, bound to that template's host.
    pub fn new(host: &'h dyn EngineHost) -> Self {
        let mut env = Environment::new();
        let default_context = json!({
            "platform": {
                "os": std::env::consts::OS,
                "family": std::env::consts::FAMILY,
                "arch": std::env::consts::ARCH,
            }
        });

        env.add_filter("camel_case", to_camel_case);
        env.add_filter("kebab_case", to_kebab_case);
        env.add_filter("pascal_case", to_pascal_case);
        env.add_filter("screaming_snake_case", to_screaming_snake_case);
        env.add_filter("snake_case", to_snake_case);
        env.add_filter("table_case", to_table_case);
        env.add_filter("train_case", to_train_case);
        env.add_filter("plural", to_plural);
        env.add_filter("singular", to_singular);
        env.add_filter("foreign_key", to_foreign_key);
        env.add_filter("regex", regex_filter);

        Self { env, default_context, host }
    }

    /// Renders a preprocessor-style template to final text.
    ///
    /// Output directives are stripped from the body and their attributes
    /// pushed to the host before rendering.
    pub fn process_t4(&self, content: &str) -> Result<String> {
        let body = self.consume_output_directives(content, true)?;
        self.render_internal(&body, &json!({}))
    }

    /// Renders a markup-style template to final text.
    ///
    /// Rendering is awaitable; callers await each template to completion
    /// before starting the next one.
    pub async fn process_razor(&self, content: &str) -> Result<String> {
        self.render_internal(content, &json!({}))
    }

    /// Preprocesses a preprocessor-style template into a Rust source
    /// artifact. Output directives are stripped but apply only to rendered
    /// output, so the host keeps its defaults.
    pub fn preprocess_t4(
        &self,
        content: &str,
        stem: &str,
        namespace: &str,
    ) -> Result<PreprocessedTemplate> {
        let body = self.consume_output_directives(content, false)?;
        Ok(generate_template_struct(&body, stem, namespace))
    }

    /// Preprocesses a markup-style template into a Rust source artifact.
    pub fn preprocess_razor(
        &self,
        content: &str,
        stem: &str,
        namespace: &str,
    ) -> Result<PreprocessedTemplate> {
        Ok(generate_template_struct(content, stem, namespace))
    }

    /// Strips every output directive from `content`. When `apply_to_host` is
    /// set, the directive attributes are pushed to the host first.
    fn consume_output_directives(
        &self,
        content: &str,
        apply_to_host: bool,
    ) -> Result<String> {
        let directive_re = output_directive_regex();

        if apply_to_host {
            let attribute_re = directive_attribute_regex();
            for directive in directive_re.captures_iter(content) {
                for attribute in attribute_re.captures_iter(&directive[1]) {
                    let (name, value) = (&attribute[1], &attribute[2]);
                    match name {
                        "extension" => self.host.set_file_extension(value),
                        "encoding" => {
                            let encoding =
                                OutputEncoding::from_name(value).ok_or_else(|| {
                                    Error::UnknownEncodingError {
                                        name: value.to_string(),
                                        source_path: self
                                            .host
                                            .template_path()
                                            .display()
                                            .to_string(),
                                    }
                                })?;
                            self.host.set_encoding(encoding);
                        }
                        _ => warn!(
                            "Ignoring unknown output directive attribute '{}'",
                            name
                        ),
                    }
                }
            }
        }

        Ok(directive_re.replace_all(content, "").into_owned())
    }

    /// Internal helper to render templates
    fn render_internal(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String> {
        let mut env = self.env.clone();
        env.add_template("temp", template)?;

        // Merge the default context with the provided context
        let merged_context = if let (Some(default_obj), Some(context_obj)) =
            (self.default_context.as_object(), context.as_object())
        {
            let mut result = default_obj.clone();
            for (key, value) in context_obj {
                result.insert(key.clone(), value.clone());
            }
            json!(result)
        } else {
            // If either isn't an object, just use the provided context
            context.clone()
        };

        let tmpl = env.get_template("temp")?;
        Ok(tmpl.render(merged_context)?)
    }
}

/// Builds the raw-string delimiter needed to embed `body` verbatim.
///
/// A `"` followed by N hashes inside the body forces a delimiter of at least
/// N+1 hashes.
fn raw_string_hashes(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut needed = 1;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let mut run = 0;
            while i + 1 + run < bytes.len() && bytes[i + 1 + run] == b'#' {
                run += 1;
            }
            needed = needed.max(run + 1);
            i += run + 1;
        } else {
            i += 1;
        }
    }
    "#".repeat(needed)
}

/// Generates the Rust source artifact for a preprocessed template: a unit
/// struct named after the file stem whose `transform_text` method renders the
/// embedded body against a caller-supplied context.
fn generate_template_struct(
    body: &str,
    stem: &str,
    namespace: &str,
) -> PreprocessedTemplate {
    let type_name = format!("{}Template", to_pascal_case(stem));
    let template_name = to_snake_case(stem);
    let hashes = raw_string_hashes(body);

    let content = format!(
        r##"// Generated by ttgen from '{stem}'. Manual edits will be overwritten.
// Namespace: {namespace}
// Rendering depends on the `minijinja` and `serde_json` crates.

/// Preprocessed text template `{stem}`.
pub struct {type_name};

impl {type_name} {{
    /// The embedded template body.
    pub const SOURCE: &'static str = r{hashes}"{body}"{hashes};

    /// Renders the embedded template body against `context`.
    pub fn transform_text(
        &self,
        context: &serde_json::Value,
    ) -> Result<String, minijinja::Error> {{
        let mut env = minijinja::Environment::new();
        env.add_template("{template_name}", Self::SOURCE)?;
        let template = env.get_template("{template_name}")?;
        template.render(context)
    }}
}}
"##
    );

    PreprocessedTemplate { content }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CommandLineEngineHost;

    #[test]
    fn renders_with_case_filters() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);
        let rendered =
            engine.process_t4("{{ 'hello world' | pascal_case }}").unwrap();
        assert_eq!(rendered, "HelloWorld");
    }

    #[test]
    fn renders_platform_default_context() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);
        let rendered = engine.process_t4("{{ platform.os }}").unwrap();
        assert_eq!(rendered, std::env::consts::OS);
    }

    #[test]
    fn output_directive_sets_host_and_is_stripped() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);
        let content =
            "<#@ output extension=\".html\" encoding=\"utf-8-bom\" #>\n<p>hi</p>";

        let rendered = engine.process_t4(content).unwrap();
        assert_eq!(rendered, "<p>hi</p>");
        assert_eq!(host.file_extension(), ".html");
        assert_eq!(host.encoding(), Some(OutputEncoding::Utf8Bom));
    }

    #[test]
    fn output_directive_without_encoding_keeps_default() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);

        engine.process_t4("<#@ output extension=\"cs\" #>\nbody").unwrap();
        assert_eq!(host.file_extension(), ".cs");
        assert_eq!(host.encoding(), None);
    }

    #[test]
    fn unknown_encoding_is_an_error() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);

        let result =
            engine.process_t4("<#@ output encoding=\"latin-1\" #>\nbody");
        match result {
            Err(Error::UnknownEncodingError { name, source_path }) => {
                assert_eq!(name, "latin-1");
                assert!(source_path.ends_with("a.tt"));
            }
            _ => panic!("Expected UnknownEncodingError"),
        }
    }

    #[test]
    fn preprocess_ignores_directive_attributes() {
        let host = CommandLineEngineHost::new("/tmp/a.tt");
        let engine = Engine::new(&host);

        let artifact = engine
            .preprocess_t4(
                "<#@ output extension=\".html\" #>\nHello {{ name }}",
                "a",
                "ttgen",
            )
            .unwrap();
        // Directive applies to rendered output only; the artifact keeps the
        // host defaults and the body loses the directive line.
        assert_eq!(host.file_extension(), ".txt");
        assert!(artifact.content.contains("Hello {{ name }}"));
        assert!(!artifact.content.contains("<#@"));
    }

    #[test]
    fn preprocessed_artifact_names_struct_after_stem() {
        let host = CommandLineEngineHost::new("/tmp/hello_page.tt");
        let engine = Engine::new(&host);

        let artifact = engine
            .preprocess_t4("Hi {{ who }}", "hello_page", "ttgen.sub.dir")
            .unwrap();
        assert!(artifact.content.contains("pub struct HelloPageTemplate;"));
        assert!(artifact.content.contains("// Namespace: ttgen.sub.dir"));
        assert!(artifact.content.contains("pub fn transform_text("));
        assert!(artifact.content.contains(r##"r#"Hi {{ who }}"#"##));
    }

    #[test]
    fn preprocess_razor_keeps_full_body() {
        let host = CommandLineEngineHost::new("/tmp/b.cshtml");
        let engine = Engine::new(&host);

        let artifact =
            engine.preprocess_razor("<p>{{ title }}</p>", "b", "ttgen").unwrap();
        assert!(artifact.content.contains("pub struct BTemplate;"));
        assert!(artifact.content.contains("<p>{{ title }}</p>"));
    }

    #[test]
    fn razor_rendering_awaits_to_completion() {
        let host = CommandLineEngineHost::new("/tmp/b.cshtml");
        let engine = Engine::new(&host);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let rendered = runtime
            .block_on(engine.process_razor("value: {{ platform.arch }}"))
            .unwrap();
        assert_eq!(rendered, format!("value: {}", std::env::consts::ARCH));
    }

    #[test]
    fn raw_string_delimiter_grows_past_quote_hash_runs() {
        assert_eq!(raw_string_hashes("plain"), "#");
        assert_eq!(raw_string_hashes("say \"hi\""), "#");
        assert_eq!(raw_string_hashes("quote \"# inside"), "##");
        assert_eq!(raw_string_hashes("quote \"## inside"), "###");
    }

    #[test]
    fn embedded_body_with_quotes_stays_intact() {
        let host = CommandLineEngineHost::new("/tmp/q.tt");
        let engine = Engine::new(&host);

        let artifact =
            engine.preprocess_t4("a \"# tricky\" body", "q", "ttgen").unwrap();
        assert!(artifact.content.contains(r####"r##"a "# tricky" body"##"####));
    }
}
