//! Per-type customization pipeline.
//!
//! Customizations are registered ahead of building and applied to freshly
//! cloned modules immediately before processing, outer loop over
//! customizations in registration order, inner loop over modules.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use aster_common::BoxError;

use crate::error::PipelineError;
use crate::module::Module;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Action<T> = Box<dyn Fn(&mut T) -> Result<(), BoxError> + Send + Sync>;

/// A registered mutation, optionally guarded by a predicate.
pub struct Customization<T> {
    predicate: Option<Predicate<T>>,
    action: Action<T>,
}

impl<T> Customization<T> {
    /// A customization applied to every module.
    pub fn always<A>(action: A) -> Self
    where
        A: Fn(&mut T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            predicate: None,
            action: Box::new(action),
        }
    }

    /// A customization applied to modules matching `predicate`.
    pub fn when<P, A>(predicate: P, action: A) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        A: Fn(&mut T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Box::new(predicate)),
            action: Box::new(action),
        }
    }

    /// Applies the action if the predicate (if any) accepts the module.
    pub fn apply(&self, module: &mut T) -> Result<(), BoxError> {
        match &self.predicate {
            Some(predicate) if !predicate(module) => Ok(()),
            _ => (self.action)(module),
        }
    }
}

/// Customization lists for every module type.
#[derive(Default)]
pub struct Customizations {
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Customizations {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a customization for `T`.
    pub fn push<T: Module>(&mut self, customization: Customization<T>) {
        let list = self
            .by_type
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<Customization<T>>::new()));
        if let Some(list) = list.downcast_mut::<Vec<Customization<T>>>() {
            list.push(customization);
        }
    }

    /// The customizations registered for `T`, in registration order.
    pub fn for_type<T: Module>(&self) -> &[Customization<T>] {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|list| list.downcast_ref::<Vec<Customization<T>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Applies every customization for `T` to `modules`.
    ///
    /// Stops at the first failure, reporting the module it happened on.
    pub fn apply<T: Module>(&self, modules: &mut [T]) -> Result<(), PipelineError> {
        for customization in self.for_type::<T>() {
            for module in modules.iter_mut() {
                customization
                    .apply(module)
                    .map_err(|reason| PipelineError::Customization {
                        kind: T::KIND,
                        module: module.path().to_string(),
                        reason,
                    })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Label {
        path: String,
        text: String,
    }

    impl Module for Label {
        const KIND: &'static str = "Label";

        fn path(&self) -> &str {
            &self.path
        }

        fn process(&mut self, _application: &Application) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Other {
        path: String,
    }

    impl Module for Other {
        const KIND: &'static str = "Other";

        fn path(&self) -> &str {
            &self.path
        }

        fn process(&mut self, _application: &Application) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn label(path: &str) -> Label {
        Label {
            path: path.to_string(),
            text: "x".to_string(),
        }
    }

    #[test]
    fn applies_in_registration_order() {
        let mut c = Customizations::new();
        c.push(Customization::always(|m: &mut Label| {
            m.text.push('a');
            Ok(())
        }));
        c.push(Customization::when(
            |m: &Label| m.path.starts_with("keep"),
            |m: &mut Label| {
                m.text.push('b');
                Ok(())
            },
        ));

        let mut modules = vec![label("keep/1"), label("skip/2")];
        c.apply(&mut modules).unwrap();
        assert_eq!(modules[0].text, "xab");
        assert_eq!(modules[1].text, "xa");
    }

    #[test]
    fn types_are_independent() {
        let mut c = Customizations::new();
        c.push(Customization::always(|m: &mut Label| {
            m.text.push('!');
            Ok(())
        }));
        assert_eq!(c.for_type::<Label>().len(), 1);
        assert!(c.for_type::<Other>().is_empty());
    }

    #[test]
    fn failure_names_module() {
        let mut c = Customizations::new();
        c.push(Customization::when(
            |m: &Label| m.path == "bad",
            |_m: &mut Label| Err("refused".into()),
        ));
        let mut modules = vec![label("good"), label("bad")];
        let err = c.apply(&mut modules).unwrap_err();
        match err {
            PipelineError::Customization { kind, module, .. } => {
                assert_eq!(kind, "Label");
                assert_eq!(module, "bad");
            }
            other => panic!("expected Customization error, got {other:?}"),
        }
    }

    #[test]
    fn every_customization_sees_unprocessed_modules_before_the_next() {
        let mut c = Customizations::new();
        c.push(Customization::always(|m: &mut Label| {
            m.text = format!("{}1", m.text);
            Ok(())
        }));
        c.push(Customization::always(|m: &mut Label| {
            assert!(m.text.ends_with('1'));
            m.text.push('2');
            Ok(())
        }));
        let mut modules = vec![label("a"), label("b"), label("c")];
        c.apply(&mut modules).unwrap();
        assert!(modules.iter().all(|m| m.text == "x12"));
    }
}
