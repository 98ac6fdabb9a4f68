//! Utility helpers available to every template: case conversion, path and
//! name helpers, version parsing, property merging and de-duplication of
//! dependency / property lists.
//!
//! | helper                               | example                                             |
//! |--------------------------------------|-----------------------------------------------------|
//! | `pascal_case s`                      | `foo-bar` → `FooBar`                                 |
//! | `camel_case s` / `snake_case s` / `kebab_case s` | `FooBar` → `fooBar` / `foo_bar` / `foo-bar`  |
//! | `pascal_case_delim s "-"`            | splits only on the given delimiter                  |
//! | `concat a b ...`                     | string concatenation                                |
//! | `json v`                             | `v` as a JSON literal, safe to embed in YAML          |
//! | `file_name p` / `file_stem p` / `file_extension p` | `a/b.tar.gz` → `b.tar.gz` / `b.tar` / `gz` |
//! | `smart_package_name base name`       | `com.acme.api` + `api_model` → `com.acme.api.model` |
//! | `parse_version v`                    | object with `major`, `minor`, `revision`, `qualifier` |
//! | `version_major_minor v`              | `1.4.2` → `1.4`                                      |
//! | `random_uuid`                        | a fresh v4 UUID                                      |
//! | `merge a b exclude="x,y"`            | `b`'s entries overlaid on `a`                        |
//! | `distinct_dependencies list`         | last entry per `groupId:artifactId` wins             |
//! | `distinct_properties list`           | last entry per `name` wins                           |
//! | `default_artifact_version [path]`    | `major.minor` from `<path>/parent/pom.xml`, else `1.0` |
//! | `config "section"`                   | a section of the tool configuration's `settings`      |
//!
//! Without an argument `default_artifact_version` reads the parent pom under
//! `request.installation_path`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde_json::{json, Map, Value};

use crate::pom;
use crate::version::Version;

handlebars_helper!(pascal_case: |s: str| s.to_upper_camel_case());
handlebars_helper!(camel_case: |s: str| s.to_lower_camel_case());
handlebars_helper!(snake_case: |s: str| s.to_snake_case());
handlebars_helper!(kebab_case: |s: str| s.to_kebab_case());
handlebars_helper!(pascal_case_delim: |s: str, delimiter: str| pascal_case_with(s, delimiter));

handlebars_helper!(concat: |*args| args
    .iter()
    .map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
    .collect::<String>());

handlebars_helper!(json_literal: |v: Json| serde_json::to_string(v).unwrap_or_default());

handlebars_helper!(file_name: |p: str| Path::new(p)
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default());
handlebars_helper!(file_stem: |p: str| Path::new(p)
    .file_stem()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default());
handlebars_helper!(file_extension: |p: str| Path::new(p)
    .extension()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default());

handlebars_helper!(smart_package_name: |base: str, name: str| smart_package(base, name));

handlebars_helper!(parse_version: |v: str| match Version::parse(v) {
    Some(version) => json!({
        "major": version.major,
        "minor": version.minor,
        "revision": version.revision,
        "qualifier": version.qualifier,
    }),
    None => Value::Null,
});
handlebars_helper!(version_major_minor: |v: str| Version::parse(v)
    .map(|version| version.major_minor())
    .unwrap_or_default());

handlebars_helper!(random_uuid: |*_args| uuid::Uuid::new_v4().to_string());

handlebars_helper!(merge: |base: object, overlay: object, {exclude: str = ""}| {
    merge_objects(base, overlay, exclude)
});

handlebars_helper!(distinct_dependencies: |list: array| distinct_by(list, dependency_key));
handlebars_helper!(distinct_properties: |list: array| distinct_by(list, property_key));

/// Register every support helper on `hbs`.
pub fn register(hbs: &mut Handlebars<'static>) {
    hbs.register_helper("pascal_case", Box::new(pascal_case));
    hbs.register_helper("camel_case", Box::new(camel_case));
    hbs.register_helper("snake_case", Box::new(snake_case));
    hbs.register_helper("kebab_case", Box::new(kebab_case));
    hbs.register_helper("pascal_case_delim", Box::new(pascal_case_delim));
    hbs.register_helper("concat", Box::new(concat));
    hbs.register_helper("json", Box::new(json_literal));
    hbs.register_helper("file_name", Box::new(file_name));
    hbs.register_helper("file_stem", Box::new(file_stem));
    hbs.register_helper("file_extension", Box::new(file_extension));
    hbs.register_helper("smart_package_name", Box::new(smart_package_name));
    hbs.register_helper("parse_version", Box::new(parse_version));
    hbs.register_helper("version_major_minor", Box::new(version_major_minor));
    hbs.register_helper("random_uuid", Box::new(random_uuid));
    hbs.register_helper("merge", Box::new(merge));
    hbs.register_helper("distinct_dependencies", Box::new(distinct_dependencies));
    hbs.register_helper("distinct_properties", Box::new(distinct_properties));
    hbs.register_helper("default_artifact_version", Box::new(DefaultArtifactVersion));
    register_settings(hbs, &BTreeMap::new());
}

/// Make `settings` available through the `config` helper, replacing any
/// sections registered before.
pub fn register_settings(hbs: &mut Handlebars<'static>, settings: &BTreeMap<String, Value>) {
    hbs.register_helper("config", Box::new(ConfigSection(Arc::new(settings.clone()))));
}

struct DefaultArtifactVersion;

impl HelperDef for DefaultArtifactVersion {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let path = match h.param(0) {
            Some(param) => param.value().as_str().map(str::to_string).ok_or_else(|| {
                RenderErrorReason::Other("default_artifact_version: path must be a string".into())
            })?,
            None => ctx
                .data()
                .pointer("/request/installation_path")
                .and_then(Value::as_str)
                .unwrap_or(".")
                .to_string(),
        };
        Ok(ScopedJson::Derived(Value::String(pom::default_artifact_version(
            Path::new(&path),
        ))))
    }
}

struct ConfigSection(Arc<BTreeMap<String, Value>>);

impl HelperDef for ConfigSection {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let name = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("config", 0))?;
        let section = self
            .0
            .get(name)
            .ok_or_else(|| RenderErrorReason::Other(format!("config: no section named {name}")))?;
        Ok(ScopedJson::Derived(section.clone()))
    }
}

/// `foo-bar` with delimiter `-` → `FooBar`. Each word is lower-cased except
/// for its first character.
fn pascal_case_with(s: &str, delimiter: &str) -> String {
    s.split(delimiter)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Append `name` to `base`, dropping the part of `name` that repeats the last
/// package segment of `base`.
fn smart_package(base: &str, name: &str) -> String {
    let last = base.rsplit('.').next().unwrap_or(base);
    let suffix = if name == last {
        ""
    } else if let Some(rest) = name.strip_prefix(last).and_then(|r| r.strip_prefix('_')) {
        rest
    } else {
        name
    };

    if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{base}.{suffix}")
    }
}

fn merge_objects(base: &Map<String, Value>, overlay: &Map<String, Value>, exclude: &str) -> Value {
    let excluded: Vec<&str> = exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut merged = base.clone();
    for (key, value) in overlay {
        if !excluded.contains(&key.as_str()) {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

fn field<'a>(value: &'a Value, names: &[&str]) -> &'a str {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .unwrap_or_default()
}

fn dependency_key(value: &Value) -> String {
    format!(
        "{}:{}",
        field(value, &["groupId", "group_id"]),
        field(value, &["artifactId", "artifact_id"])
    )
}

fn property_key(value: &Value) -> String {
    field(value, &["name"]).to_string()
}

/// Keep one entry per key. A later entry replaces an earlier one in place, so
/// the first occurrence decides the position.
fn distinct_by(list: &[Value], key: fn(&Value) -> String) -> Value {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut distinct: Vec<Value> = Vec::new();
    for item in list {
        let k = key(item);
        match positions.get(&k) {
            Some(&i) => distinct[i] = item.clone(),
            None => {
                positions.insert(k, distinct.len());
                distinct.push(item.clone());
            }
        }
    }
    Value::Array(distinct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::renderer::TemplateRenderer;

    fn render(template: &str, data: Value) -> String {
        TemplateRenderer::new().render(template, &data).unwrap()
    }

    #[test]
    fn test_case_helpers() {
        let data = json!({ "name": "foo-bar" });
        assert_eq!(render("{{pascal_case name}}", data.clone()), "FooBar");
        assert_eq!(render("{{camel_case name}}", data.clone()), "fooBar");
        assert_eq!(render("{{snake_case name}}", data.clone()), "foo_bar");
        assert_eq!(render("{{kebab_case \"FooBar\"}}", data), "foo-bar");
    }

    #[test]
    fn test_pascal_case_with_delimiter() {
        assert_eq!(pascal_case_with("foo-bar", "-"), "FooBar");
        assert_eq!(pascal_case_with("FOO-bAR", "-"), "FooBar");
        assert_eq!(pascal_case_with("foo_bar-baz", "-"), "Foo_barBaz");
    }

    #[test]
    fn test_path_helpers() {
        let data = json!({ "p": "dir/archive.tar.gz" });
        assert_eq!(render("{{file_name p}}", data.clone()), "archive.tar.gz");
        assert_eq!(render("{{file_stem p}}", data.clone()), "archive.tar");
        assert_eq!(render("{{file_extension p}}", data), "gz");
    }

    #[test]
    fn test_smart_package_name() {
        assert_eq!(smart_package("com.acme.api", "api"), "com.acme.api");
        assert_eq!(smart_package("com.acme.api", "api_model"), "com.acme.api.model");
        assert_eq!(smart_package("com.acme.api", "model"), "com.acme.api.model");
        assert_eq!(smart_package("acme", "acme_core"), "acme.core");
    }

    #[test]
    fn test_version_helpers() {
        let data = json!({ "v": "1.4.2-pc" });
        assert_eq!(render("{{version_major_minor v}}", data.clone()), "1.4");
        assert_eq!(
            render("{{#with (parse_version v)}}{{major}}/{{minor}}/{{revision}}/{{qualifier}}{{/with}}", data),
            "1/4/2/pc"
        );
    }

    #[test]
    fn test_concat() {
        assert_eq!(render("{{concat \"a\" 1 \"b\"}}", json!({})), "a1b");
    }

    #[test]
    fn test_json_quotes_strings_for_yaml() {
        let data = json!({ "title": "The \"Orders\" service: v2\nsecond line", "n": 3 });
        let rendered = render("title: {{json title}}\ncount: {{json n}}\n", data);
        assert_eq!(
            rendered,
            "title: \"The \\\"Orders\\\" service: v2\\nsecond line\"\ncount: 3\n"
        );

        let parsed: Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed["title"], "The \"Orders\" service: v2\nsecond line");
        assert_eq!(parsed["count"], 3);
    }

    #[test]
    fn test_default_artifact_version_reads_parent_pom() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().to_string_lossy().into_owned();
        let data = json!({ "request": { "installation_path": install } });

        assert_eq!(render("{{default_artifact_version}}", data.clone()), "1.0");

        std::fs::create_dir_all(dir.path().join("parent")).unwrap();
        std::fs::write(
            dir.path().join("parent/pom.xml"),
            "<project><artifactId>parent</artifactId><version>3.1.7</version></project>",
        )
        .unwrap();
        assert_eq!(render("{{default_artifact_version}}", data.clone()), "3.1");
        assert_eq!(
            render("{{default_artifact_version request.installation_path}}", data),
            "3.1"
        );
    }

    #[test]
    fn test_config_sections() {
        let mut settings = BTreeMap::new();
        settings.insert("maven".to_string(), json!({ "group_id": "com.acme", "java": 21 }));
        let renderer = TemplateRenderer::new().with_settings(&settings);

        let out = renderer
            .render("{{#with (config \"maven\")}}{{group_id}}/{{java}}{{/with}}", &json!({}))
            .unwrap();
        assert_eq!(out, "com.acme/21");
        assert!(renderer.render("{{config \"gradle\"}}", &json!({})).is_err());
        assert!(TemplateRenderer::new().render("{{config \"maven\"}}", &json!({})).is_err());
    }

    #[test]
    fn test_random_uuid_is_fresh() {
        let a = render("{{random_uuid}}", json!({}));
        let b = render("{{random_uuid}}", json!({}));
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn test_merge_with_exclusions() {
        let base = json!({ "a": 1, "b": 2 });
        let overlay = json!({ "b": 3, "c": 4, "d": 5 });
        let merged = merge_objects(
            base.as_object().unwrap(),
            overlay.as_object().unwrap(),
            "d",
        );
        assert_eq!(merged, json!({ "a": 1, "b": 3, "c": 4 }));
    }

    #[test]
    fn test_distinct_dependencies_keeps_first_position_last_value() {
        let deps = json!([
            { "groupId": "g", "artifactId": "a", "version": "1.0" },
            { "groupId": "g", "artifactId": "b", "version": "1.0" },
            { "groupId": "g", "artifactId": "a", "version": "2.0" },
        ]);
        let distinct = distinct_by(deps.as_array().unwrap(), dependency_key);
        assert_eq!(
            distinct,
            json!([
                { "groupId": "g", "artifactId": "a", "version": "2.0" },
                { "groupId": "g", "artifactId": "b", "version": "1.0" },
            ])
        );
    }

    #[test]
    fn test_distinct_properties_in_template() {
        let data = json!({ "props": [
            { "name": "x", "value": "1" },
            { "name": "x", "value": "2" },
            { "name": "y", "value": "3" },
        ]});
        assert_eq!(
            render("{{#each (distinct_properties props)}}{{name}}={{value}};{{/each}}", data),
            "x=2;y=3;"
        );
    }
}
