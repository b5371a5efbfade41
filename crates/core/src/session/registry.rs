/// Client-side mirror of the worker's durable identity store, in
/// registration order. Only ever replaced wholesale from a successful
/// list response or cleared by a store reset; a failed refresh leaves
/// the previous snapshot intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityRegistry {
    identities: Vec<String>,
}

impl IdentityRegistry {
    pub fn replace(&mut self, identities: Vec<String>) {
        self.identities = identities;
    }

    pub fn clear(&mut self) {
        self.identities.clear();
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_is_wholesale_and_ordered() {
        let mut registry = IdentityRegistry::default();
        registry.replace(vec!["Lin".to_string()]);
        registry.replace(vec!["Ada".to_string(), "Grace".to_string()]);
        assert_eq!(registry.identities(), ["Ada", "Grace"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clear_empties_the_snapshot() {
        let mut registry = IdentityRegistry::default();
        registry.replace(vec!["Ada".to_string()]);
        registry.clear();
        assert!(registry.is_empty());
    }
}
