//! Custom Elements
//!
//! Custom element registry and lifecycle callbacks. Reactions are queued on
//! the tree while mutations run and drained by the host afterwards, so that
//! no callback can observe a half-applied mutation.

use std::collections::HashMap;

use crate::{DomTree, ElementKind, NodeData, NodeId, namespace};

/// Custom elements registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
}

/// Custom element definition
#[derive(Debug, Clone)]
pub struct CustomElementDefinition {
    pub name: String,
    /// Base tag of a customized built-in
    pub extends: Option<String>,
    pub observed_attributes: Vec<String>,
    pub form_associated: bool,
}

/// Custom element options
#[derive(Debug, Clone, Default)]
pub struct CustomElementOptions {
    pub extends: Option<String>,
    pub observed_attributes: Vec<String>,
    pub form_associated: bool,
}

/// Custom element lifecycle callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCallback {
    Connected,
    Disconnected,
    Adopted,
    AttributeChanged,
}

/// Queued lifecycle callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReaction {
    pub callback: LifecycleCallback,
    pub element: NodeId,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl LifecycleReaction {
    fn new(callback: LifecycleCallback, element: NodeId) -> Self {
        Self {
            callback,
            element,
            attribute_name: None,
            old_value: None,
            new_value: None,
        }
    }
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("\"{0}\" is not a valid custom element name")]
    InvalidName(String),
    #[error("the name \"{0}\" has already been used with this registry")]
    AlreadyDefined(String),
    #[error("\"{0}\" cannot be extended")]
    ExtensionNotAllowed(String),
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(
        &mut self,
        name: &str,
        options: CustomElementOptions,
    ) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(name) {
            return Err(CustomElementError::InvalidName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            return Err(CustomElementError::AlreadyDefined(name.to_string()));
        }
        if let Some(base) = &options.extends {
            // Only built-in HTML tags can be customized
            if Self::is_valid_name(base) || ElementKind::from_html_tag(base).is_none() {
                return Err(CustomElementError::ExtensionNotAllowed(base.clone()));
            }
        }

        let definition = CustomElementDefinition {
            name: name.to_string(),
            extends: options.extends,
            observed_attributes: options.observed_attributes,
            form_associated: options.form_associated,
        };
        self.definitions.insert(name.to_string(), definition);
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        if name.chars().any(|c| c.is_ascii_uppercase()) {
            return false;
        }

        // Reserved names
        let reserved = [
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        !reserved.contains(&name)
    }
}

impl DomTree {
    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.registry
    }

    /// Define a custom element and upgrade existing elements of that name
    pub fn define_custom_element(
        &mut self,
        name: &str,
        options: CustomElementOptions,
    ) -> Result<(), CustomElementError> {
        self.registry.define(name, options)?;
        let Some(definition) = self.registry.get(name).cloned() else {
            return Ok(());
        };
        tracing::debug!("Defined custom element <{}>", name);

        for index in 0..self.len() {
            let id = NodeId(index as u32);
            let upgrade = match &self.node(id).data {
                NodeData::Element(e) => {
                    e.namespace.as_deref() == Some(namespace::HTML)
                        && match &definition.extends {
                            None => e.local_name == name && e.kind == ElementKind::Html,
                            Some(base) => {
                                e.local_name == *base && e.is_value.as_deref() == Some(name)
                            }
                        }
                }
                _ => false,
            };
            if !upgrade {
                continue;
            }
            if definition.extends.is_none() {
                if let Some(element) = self.node_mut(id).as_element_mut() {
                    element.kind = ElementKind::Custom {
                        form_associated: definition.form_associated,
                    };
                }
            }
            if self.is_connected(id) {
                self.reactions
                    .push(LifecycleReaction::new(LifecycleCallback::Connected, id));
            }
        }
        Ok(())
    }

    /// Take all queued lifecycle reactions in the order they were queued
    pub fn take_reactions(&mut self) -> Vec<LifecycleReaction> {
        std::mem::take(&mut self.reactions)
    }

    /// Definition backing an element, if it is a defined custom element
    pub fn custom_element_definition(&self, element: NodeId) -> Option<&CustomElementDefinition> {
        let data = self.node(element).as_element()?;
        if !data.is_html() {
            return None;
        }
        let name = match (&data.kind, &data.is_value) {
            (ElementKind::Custom { .. }, _) => &data.local_name,
            (_, Some(is)) => is,
            _ => return None,
        };
        self.registry
            .get(name)
            .filter(|d| d.extends.is_none() || d.extends.as_deref() == Some(data.local_name.as_str()))
    }

    pub(crate) fn enqueue_connection_reaction(&mut self, element: NodeId, connected: bool) {
        if self.custom_element_definition(element).is_none() {
            return;
        }
        let callback = if connected {
            LifecycleCallback::Connected
        } else {
            LifecycleCallback::Disconnected
        };
        self.reactions.push(LifecycleReaction::new(callback, element));
    }

    pub(crate) fn enqueue_adopted_reaction(&mut self, element: NodeId) {
        if self.custom_element_definition(element).is_some() {
            self.reactions
                .push(LifecycleReaction::new(LifecycleCallback::Adopted, element));
        }
    }

    pub(crate) fn enqueue_attribute_reaction(
        &mut self,
        element: NodeId,
        name: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        let observed = self
            .custom_element_definition(element)
            .is_some_and(|d| d.observed_attributes.iter().any(|a| a == name));
        if observed {
            self.reactions.push(LifecycleReaction {
                callback: LifecycleCallback::AttributeChanged,
                element,
                attribute_name: Some(name.to_string()),
                old_value,
                new_value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(CustomElementRegistry::is_valid_name("my-element"));
        assert!(CustomElementRegistry::is_valid_name("app-header"));
        assert!(!CustomElementRegistry::is_valid_name("myelement")); // no hyphen
        assert!(!CustomElementRegistry::is_valid_name("My-Element")); // uppercase
        assert!(!CustomElementRegistry::is_valid_name("font-face"));
    }

    #[test]
    fn test_define() {
        let mut registry = CustomElementRegistry::new();

        assert!(registry.define("my-element", CustomElementOptions::default()).is_ok());
        assert!(registry.is_defined("my-element"));

        // Duplicate
        assert_eq!(
            registry.define("my-element", CustomElementOptions::default()),
            Err(CustomElementError::AlreadyDefined("my-element".into()))
        );
    }

    #[test]
    fn test_extends_must_be_builtin() {
        let mut registry = CustomElementRegistry::new();
        let options = CustomElementOptions {
            extends: Some("other-thing".into()),
            ..Default::default()
        };
        assert!(matches!(
            registry.define("fancy-thing", options),
            Err(CustomElementError::ExtensionNotAllowed(_))
        ));
    }

    #[test]
    fn test_upgrade_and_reactions() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let body = tree.body(doc).unwrap();
        let widget = tree.create_element(doc, "x-widget").unwrap();
        tree.append_child(body, widget).unwrap();
        assert!(tree.take_reactions().is_empty());

        let options = CustomElementOptions {
            observed_attributes: vec!["size".into()],
            ..Default::default()
        };
        tree.define_custom_element("x-widget", options).unwrap();
        assert_eq!(
            tree.element_kind(widget),
            Some(ElementKind::Custom { form_associated: false })
        );

        tree.set_attribute(widget, "size", "3").unwrap();
        tree.set_attribute(widget, "color", "red").unwrap();
        tree.remove_child(body, widget).unwrap();

        let callbacks: Vec<_> = tree.take_reactions().into_iter().map(|r| r.callback).collect();
        assert_eq!(
            callbacks,
            vec![
                LifecycleCallback::Connected,
                LifecycleCallback::AttributeChanged,
                LifecycleCallback::Disconnected,
            ]
        );
    }
}
