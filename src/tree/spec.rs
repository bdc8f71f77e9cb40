use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Separator between the on-disk name and the logical reference in spec
/// document keys, e.g. `"file1.txt -> unique_file1.txt"`.
const REFERENCE_SEPARATOR: &str = " -> ";

/// Key of one spec entry: the on-disk segment name plus the logical
/// reference used in the returned registry. Plain keys use the same string
/// for both.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpecKey {
    pub name: String,
    pub reference: String,
}

impl SpecKey {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            reference: name.clone(),
            name,
        }
    }

    pub fn with_reference(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
        }
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let (name, reference) = match raw.split_once(REFERENCE_SEPARATOR) {
            Some((name, reference)) => (name.trim(), reference.trim()),
            None => (raw.trim(), raw.trim()),
        };
        if name.is_empty() {
            return Err(format!("spec key `{raw}` has an empty name"));
        }
        if reference.is_empty() {
            return Err(format!("spec key `{raw}` has an empty reference"));
        }
        Ok(Self::with_reference(name, reference))
    }
}

/// Content of one spec entry: a file, or a folder with nested contents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SpecNode {
    File,
    Folder(TreeSpec),
}

/// Ordered description of a directory tree. Entries keep insertion order
/// because duplicate-reference numbering depends on encounter order.
///
/// A mapping literal cannot repeat a plain key, so intended same-level name
/// collisions must use distinct references via [`SpecKey::with_reference`]
/// (or the `"name -> reference"` key form in spec documents). The entry
/// list itself does not enforce uniqueness; repeated names behave exactly
/// like colliding references.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TreeSpec {
    entries: Vec<(SpecKey, SpecNode)>,
}

impl TreeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file entry whose reference equals its name.
    pub fn file(mut self, name: impl Into<String>) -> Self {
        self.entries.push((SpecKey::new(name), SpecNode::File));
        self
    }

    /// Append a file entry with an explicit reference.
    pub fn file_as(mut self, name: impl Into<String>, reference: impl Into<String>) -> Self {
        self.entries
            .push((SpecKey::with_reference(name, reference), SpecNode::File));
        self
    }

    /// Append a folder entry whose reference equals its name.
    pub fn folder(mut self, name: impl Into<String>, contents: TreeSpec) -> Self {
        self.entries
            .push((SpecKey::new(name), SpecNode::Folder(contents)));
        self
    }

    /// Append a folder entry with an explicit reference.
    pub fn folder_as(
        mut self,
        name: impl Into<String>,
        reference: impl Into<String>,
        contents: TreeSpec,
    ) -> Self {
        self.entries.push((
            SpecKey::with_reference(name, reference),
            SpecNode::Folder(contents),
        ));
        self
    }

    pub fn entries(&self) -> &[(SpecKey, SpecNode)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TreeSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = TreeSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a directory tree mapping")
            }

            fn visit_map<M>(self, mut map: M) -> Result<TreeSpec, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(raw) = map.next_key::<String>()? {
                    let key = SpecKey::parse(&raw).map_err(de::Error::custom)?;
                    // null marks a file, a nested mapping marks a folder;
                    // anything else is rejected naming the offending key.
                    let node = map
                        .next_value::<Option<TreeSpec>>()
                        .map_err(|err| de::Error::custom(format!("entry `{raw}`: {err}")))?;
                    let node = match node {
                        Some(contents) => SpecNode::Folder(contents),
                        None => SpecNode::File,
                    };
                    entries.push((key, node));
                }
                Ok(TreeSpec { entries })
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_pair_keys() {
        let raw = r#"{
            "folder1 -> unique_folder1": {
                "file1.txt -> unique_file1.txt": null,
                "subfolder2": {}
            },
            "folder2": { "file2.txt": null }
        }"#;
        let spec: TreeSpec = serde_json::from_str(raw).unwrap();

        assert_eq!(spec.len(), 2);
        let (key, node) = &spec.entries()[0];
        assert_eq!(
            key,
            &SpecKey::with_reference("folder1", "unique_folder1")
        );
        let SpecNode::Folder(contents) = node else {
            panic!("folder1 should be a folder");
        };
        assert_eq!(
            contents.entries()[0].0,
            SpecKey::with_reference("file1.txt", "unique_file1.txt")
        );
        assert_eq!(contents.entries()[0].1, SpecNode::File);
        assert_eq!(
            contents.entries()[1],
            (SpecKey::new("subfolder2"), SpecNode::Folder(TreeSpec::new()))
        );
    }

    #[test]
    fn preserves_document_order() {
        let raw = r#"{ "zebra": null, "apple": null, "mango": null }"#;
        let spec: TreeSpec = serde_json::from_str(raw).unwrap();
        let names: Vec<&str> = spec
            .entries()
            .iter()
            .map(|(key, _)| key.name.as_str())
            .collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn rejects_non_mapping_values() {
        let err = serde_json::from_str::<TreeSpec>(r#"{ "notes.txt": 3 }"#).unwrap_err();
        assert!(err.to_string().contains("entry `notes.txt`"), "{err}");

        let err = serde_json::from_str::<TreeSpec>(r#"{ "a": { "b": "oops" } }"#).unwrap_err();
        assert!(err.to_string().contains("entry `b`"), "{err}");
    }

    #[test]
    fn rejects_empty_names_and_references() {
        let err = serde_json::from_str::<TreeSpec>(r#"{ " -> ref": {} }"#).unwrap_err();
        assert!(err.to_string().contains("empty name"), "{err}");

        let err = serde_json::from_str::<TreeSpec>(r#"{ "name -> ": null }"#).unwrap_err();
        assert!(err.to_string().contains("empty reference"), "{err}");
    }

    #[test]
    fn builder_api_matches_parsed_document() {
        let raw = r#"{
            "src -> source": { "main.rs": null },
            "README.md": null
        }"#;
        let parsed: TreeSpec = serde_json::from_str(raw).unwrap();
        let built = TreeSpec::new()
            .folder_as("src", "source", TreeSpec::new().file("main.rs"))
            .file("README.md");
        assert_eq!(parsed, built);
    }
}
