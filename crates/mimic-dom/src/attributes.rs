//! Element attributes
//!
//! Attributes are Attr nodes in the arena. An element keeps their ids in
//! insertion order; at most one attribute per (namespace, local name) pair.

use crate::{DomError, DomResult, DomTree, NodeId, validation};

impl DomTree {
    /// HTML elements in HTML documents match attribute names case-insensitively
    fn normalize_attribute_name(&self, element: NodeId, name: &str) -> String {
        let lowercase = self.node(element).as_element().is_some_and(|e| e.is_html())
            && self.is_html_document(self.node_document(element));
        if lowercase {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    fn attribute_ids(&self, element: NodeId) -> &[NodeId] {
        self.node(element)
            .as_element()
            .map(|e| e.attributes.as_slice())
            .unwrap_or_default()
    }

    /// Attribute node ids of an element in list order
    pub fn attributes(&self, element: NodeId) -> &[NodeId] {
        self.attribute_ids(element)
    }

    /// `getAttributeNode`: first attribute whose qualified name matches
    pub fn get_attribute_node(&self, element: NodeId, name: &str) -> Option<NodeId> {
        let name = self.normalize_attribute_name(element, name);
        self.attribute_ids(element).iter().copied().find(|&attr| {
            self.node(attr)
                .as_attr()
                .is_some_and(|a| a.qualified_name() == name)
        })
    }

    /// `getAttributeNodeNS`
    pub fn get_attribute_node_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.attribute_ids(element).iter().copied().find(|&attr| {
            self.node(attr)
                .as_attr()
                .is_some_and(|a| a.namespace.as_deref() == namespace && a.local_name == local_name)
        })
    }

    fn attribute_value(&self, attr: NodeId) -> Option<String> {
        self.node(attr).as_attr().map(|a| a.value.clone())
    }

    /// `getAttribute`
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.get_attribute_node(element, name)
            .and_then(|attr| self.attribute_value(attr))
    }

    /// `getAttributeNS`
    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<String> {
        self.get_attribute_node_ns(element, namespace, local_name)
            .and_then(|attr| self.attribute_value(attr))
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_attribute_node(element, name).is_some()
    }

    pub fn has_attribute_ns(&self, element: NodeId, namespace: Option<&str>, local_name: &str) -> bool {
        self.get_attribute_node_ns(element, namespace, local_name).is_some()
    }

    pub fn has_attributes(&self, element: NodeId) -> bool {
        !self.attribute_ids(element).is_empty()
    }

    /// Qualified names in list order
    pub fn get_attribute_names(&self, element: NodeId) -> Vec<String> {
        self.attribute_ids(element)
            .iter()
            .filter_map(|&attr| self.node(attr).as_attr().map(|a| a.qualified_name()))
            .collect()
    }

    fn ensure_element(&self, element: NodeId, method: &str) -> DomResult<()> {
        if self.is_element(element) {
            Ok(())
        } else {
            Err(DomError::Type(format!(
                "Failed to execute '{}' on 'Element': Illegal invocation",
                method
            )))
        }
    }

    /// `setAttribute`
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.ensure_element(element, "setAttribute")?;
        if !validation::is_valid_name(name) {
            return Err(DomError::InvalidCharacter(format!(
                "Failed to execute 'setAttribute' on 'Element': '{}' is not a valid attribute name.",
                name
            )));
        }
        match self.get_attribute_node(element, name) {
            Some(attr) => self.change_attribute(attr, value),
            None => {
                let name = self.normalize_attribute_name(element, name);
                let doc = self.node_document(element);
                let attr = self.push_attr(doc, None, None, name, value.to_string());
                self.append_attribute(element, attr);
            }
        }
        Ok(())
    }

    /// `setAttributeNS`
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> DomResult<()> {
        self.ensure_element(element, "setAttributeNS")?;
        let (namespace, prefix, local_name) =
            validation::validate_and_extract(namespace, qualified_name)?;
        self.store_attribute(element, namespace, prefix, local_name, value);
        Ok(())
    }

    /// Set an attribute the HTML tokenizer already accepted. Names such as
    /// `@click` or `:class` are legal in HTML source but fail the XML name
    /// checks of `setAttributeNS`, so they are stored as given.
    pub fn set_parsed_attribute(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        prefix: Option<&str>,
        local_name: &str,
        value: &str,
    ) {
        if self.node(element).as_element().is_none() {
            return;
        }
        self.store_attribute(
            element,
            namespace.map(str::to_string),
            prefix.map(str::to_string),
            local_name.to_string(),
            value,
        );
    }

    fn store_attribute(
        &mut self,
        element: NodeId,
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        value: &str,
    ) {
        match self.get_attribute_node_ns(element, namespace.as_deref(), &local_name) {
            Some(attr) => self.change_attribute(attr, value),
            None => {
                let doc = self.node_document(element);
                let attr = self.push_attr(doc, namespace, prefix, local_name, value.to_string());
                self.append_attribute(element, attr);
            }
        }
    }

    /// `removeAttribute`; returns whether something was removed
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> bool {
        match self.get_attribute_node(element, name) {
            Some(attr) => {
                self.detach_attribute(element, attr);
                true
            }
            None => false,
        }
    }

    /// `removeAttributeNS`
    pub fn remove_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> bool {
        match self.get_attribute_node_ns(element, namespace, local_name) {
            Some(attr) => {
                self.detach_attribute(element, attr);
                true
            }
            None => false,
        }
    }

    /// `toggleAttribute`; returns whether the attribute is present afterwards
    pub fn toggle_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        force: Option<bool>,
    ) -> DomResult<bool> {
        if !validation::is_valid_name(name) {
            return Err(DomError::InvalidCharacter(format!(
                "Failed to execute 'toggleAttribute' on 'Element': '{}' is not a valid attribute name.",
                name
            )));
        }
        let present = self.has_attribute(element, name);
        match (present, force) {
            (false, None | Some(true)) => {
                self.set_attribute(element, name, "")?;
                Ok(true)
            }
            (true, None | Some(false)) => {
                self.remove_attribute(element, name);
                Ok(false)
            }
            (present, Some(_)) => Ok(present),
        }
    }

    /// `setAttributeNode`: returns the replaced attribute, if any
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        self.ensure_element(element, "setAttributeNode")?;
        let Some(data) = self.node(attr).as_attr() else {
            return Err(DomError::Type(
                "Failed to execute 'setAttributeNode' on 'Element': parameter 1 is not of type 'Attr'.".into(),
            ));
        };
        match data.owner_element {
            Some(owner) if owner == element => return Ok(Some(attr)),
            Some(_) => {
                return Err(DomError::InUseAttribute(
                    "Failed to execute 'setAttributeNode' on 'Element': The node provided is an attribute node that is already an attribute of another Element; attribute nodes must be explicitly cloned.".into(),
                ));
            }
            None => {}
        }
        let (namespace, local_name, value) =
            (data.namespace.clone(), data.local_name.clone(), data.value.clone());

        let doc = self.node_document(element);
        if self.node_document(attr) != doc {
            self.node_mut(attr).owner_document = doc;
        }

        let old = self.get_attribute_node_ns(element, namespace.as_deref(), &local_name);
        match old {
            Some(old) => {
                let old_value = self.attribute_value(old);
                let name = self.node(old).as_attr().map(|a| a.qualified_name()).unwrap_or_default();
                if let Some(e) = self.node_mut(element).as_element_mut() {
                    if let Some(slot) = e.attributes.iter_mut().find(|a| **a == old) {
                        *slot = attr;
                    }
                }
                if let Some(a) = self.node_mut(old).as_attr_mut() {
                    a.owner_element = None;
                }
                if let Some(a) = self.node_mut(attr).as_attr_mut() {
                    a.owner_element = Some(element);
                }
                self.enqueue_attribute_reaction(element, &name, old_value, Some(value));
            }
            None => self.append_attribute(element, attr),
        }
        Ok(old)
    }

    /// `removeAttributeNode`
    pub fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<NodeId> {
        if !self.attribute_ids(element).contains(&attr) {
            return Err(DomError::NotFound(
                "Failed to execute 'removeAttributeNode' on 'Element': The attribute provided is not owned by this element.".into(),
            ));
        }
        self.detach_attribute(element, attr);
        Ok(attr)
    }

    fn append_attribute(&mut self, element: NodeId, attr: NodeId) {
        if let Some(e) = self.node_mut(element).as_element_mut() {
            e.attributes.push(attr);
        }
        let Some(a) = self.node_mut(attr).as_attr_mut() else {
            return;
        };
        a.owner_element = Some(element);
        let (name, value) = (a.qualified_name(), a.value.clone());
        self.enqueue_attribute_reaction(element, &name, None, Some(value));
    }

    fn detach_attribute(&mut self, element: NodeId, attr: NodeId) {
        if let Some(e) = self.node_mut(element).as_element_mut() {
            e.attributes.retain(|&a| a != attr);
        }
        let Some(a) = self.node_mut(attr).as_attr_mut() else {
            return;
        };
        a.owner_element = None;
        let (name, value) = (a.qualified_name(), a.value.clone());
        self.enqueue_attribute_reaction(element, &name, Some(value), None);
    }

    /// Change the value of an attribute node, notifying its owner element
    pub(crate) fn change_attribute(&mut self, attr: NodeId, value: &str) {
        let Some(a) = self.node_mut(attr).as_attr_mut() else {
            return;
        };
        let old_value = std::mem::replace(&mut a.value, value.to_string());
        let (owner, name) = (a.owner_element, a.qualified_name());
        if let Some(owner) = owner {
            self.enqueue_attribute_reaction(owner, &name, Some(old_value), Some(value.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace;

    #[test]
    fn test_set_get_remove() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let div = tree.create_element(doc, "div").unwrap();

        tree.set_attribute(div, "Data-X", "1").unwrap();
        assert_eq!(tree.get_attribute(div, "data-x").as_deref(), Some("1"));
        assert_eq!(tree.get_attribute_names(div), vec!["data-x"]);

        tree.set_attribute(div, "data-x", "2").unwrap();
        assert_eq!(tree.attributes(div).len(), 1);
        assert_eq!(tree.get_attribute(div, "DATA-X").as_deref(), Some("2"));

        assert!(tree.remove_attribute(div, "data-x"));
        assert!(!tree.has_attribute(div, "data-x"));
        assert!(!tree.remove_attribute(div, "data-x"));
    }

    #[test]
    fn test_xml_names_are_case_sensitive() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("application/xml");
        let el = tree.create_element(doc, "item").unwrap();
        tree.set_attribute(el, "Key", "v").unwrap();
        assert_eq!(tree.get_attribute(el, "key"), None);
        assert_eq!(tree.get_attribute(el, "Key").as_deref(), Some("v"));
    }

    #[test]
    fn test_namespaced_attributes() {
        let mut tree = DomTree::new();
        let doc = tree.create_document("image/svg+xml");
        let el = tree.create_element_ns(doc, Some(namespace::SVG), "use").unwrap();
        tree.set_attribute_ns(el, Some(namespace::XLINK), "xlink:href", "#a").unwrap();
        assert_eq!(
            tree.get_attribute_ns(el, Some(namespace::XLINK), "href").as_deref(),
            Some("#a")
        );
        assert_eq!(tree.get_attribute(el, "xlink:href").as_deref(), Some("#a"));
        assert!(tree.remove_attribute_ns(el, Some(namespace::XLINK), "href"));
        assert!(!tree.has_attributes(el));
    }

    #[test]
    fn test_toggle_attribute() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let input = tree.create_element(doc, "input").unwrap();
        assert!(tree.toggle_attribute(input, "disabled", None).unwrap());
        assert_eq!(tree.get_attribute(input, "disabled").as_deref(), Some(""));
        assert!(tree.toggle_attribute(input, "disabled", Some(true)).unwrap());
        assert!(!tree.toggle_attribute(input, "disabled", None).unwrap());
        assert!(!tree.toggle_attribute(input, "disabled", Some(false)).unwrap());
    }

    #[test]
    fn test_attribute_node_ownership() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let attr = tree.create_attribute(doc, "title").unwrap();
        tree.set_node_value(attr, "hello");

        assert_eq!(tree.set_attribute_node(a, attr).unwrap(), None);
        assert_eq!(tree.get_attribute(a, "title").as_deref(), Some("hello"));
        assert!(matches!(
            tree.set_attribute_node(b, attr),
            Err(DomError::InUseAttribute(_))
        ));

        let replacement = tree.create_attribute(doc, "title").unwrap();
        assert_eq!(tree.set_attribute_node(a, replacement).unwrap(), Some(attr));
        assert_eq!(tree.node(attr).as_attr().and_then(|a| a.owner_element()), None);

        assert!(tree.remove_attribute_node(a, attr).is_err());
        assert_eq!(tree.remove_attribute_node(a, replacement).unwrap(), replacement);
    }

    #[test]
    fn test_invalid_attribute_name() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let div = tree.create_element(doc, "div").unwrap();
        assert!(matches!(
            tree.set_attribute(div, "a b", "x"),
            Err(DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_parsed_attribute_skips_name_checks() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("");
        let div = tree.create_element(doc, "div").unwrap();
        tree.set_parsed_attribute(div, None, None, "@click", "go()");
        tree.set_parsed_attribute(div, None, None, ":class", "c");
        tree.set_parsed_attribute(div, None, None, ":class", "d");
        assert_eq!(tree.attributes(div).len(), 2);
        assert_eq!(tree.get_attribute(div, "@click").as_deref(), Some("go()"));
        assert_eq!(tree.get_attribute(div, ":class").as_deref(), Some("d"));
    }
}
