//! Stacks of generic argument lists.

use crate::metadata::signatures::TypeSignature;

/// Two independent stacks of generic argument frames.
///
/// One stack binds type parameters (`!n`), the other method parameters
/// (`!!n`). Only the top frame of each stack is consulted directly; outer
/// frames are reached when the top frame maps a parameter onto another
/// parameter of the same kind, which is how nested generic contexts forward
/// their arguments.
#[derive(Debug, Default, Clone)]
pub struct GenericArguments<'a> {
    type_args: Vec<&'a [TypeSignature]>,
    method_args: Vec<&'a [TypeSignature]>,
}

impl<'a> GenericArguments<'a> {
    /// Creates empty stacks, every parameter passes through
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a frame of type-level arguments
    pub fn push_type_args(&mut self, args: &'a [TypeSignature]) {
        self.type_args.push(args);
    }

    /// Pushes a frame of method-level arguments
    pub fn push_method_args(&mut self, args: &'a [TypeSignature]) {
        self.method_args.push(args);
    }

    /// Removes the active type-level frame
    pub fn pop_type_args(&mut self) -> Option<&'a [TypeSignature]> {
        self.type_args.pop()
    }

    /// Removes the active method-level frame
    pub fn pop_method_args(&mut self) -> Option<&'a [TypeSignature]> {
        self.method_args.pop()
    }

    /// Returns true if neither stack holds a frame
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_args.is_empty() && self.method_args.is_empty()
    }

    /// Looks up type parameter `!index` in the active type frame
    ///
    /// Returns `None` if there is no frame or `index` is out of its bounds.
    #[must_use]
    pub fn resolve_var(&self, index: u32) -> Option<&'a TypeSignature> {
        Self::resolve_in(&self.type_args, index, |sig| match sig {
            TypeSignature::GenericParamType(number) => Some(*number),
            _ => None,
        })
    }

    /// Looks up method parameter `!!index` in the active method frame
    ///
    /// Returns `None` if there is no frame or `index` is out of its bounds.
    #[must_use]
    pub fn resolve_mvar(&self, index: u32) -> Option<&'a TypeSignature> {
        Self::resolve_in(&self.method_args, index, |sig| match sig {
            TypeSignature::GenericParamMethod(number) => Some(*number),
            _ => None,
        })
    }

    /// Whole-node substitution rule used by the resolver.
    ///
    /// Generic parameters are replaced by their binding. A method parameter
    /// bound to a type parameter is resolved further through the type frames.
    /// Every other node, and every unbound parameter, yields `None`.
    #[must_use]
    pub fn resolve(&self, sig: &TypeSignature) -> Option<&'a TypeSignature> {
        match sig {
            TypeSignature::GenericParamType(index) => self.resolve_var(*index),
            TypeSignature::GenericParamMethod(index) => {
                let bound = self.resolve_mvar(*index)?;
                match bound {
                    TypeSignature::GenericParamType(index) => {
                        self.resolve_var(*index).or(Some(bound))
                    }
                    _ => Some(bound),
                }
            }
            _ => None,
        }
    }

    fn resolve_in(
        stack: &[&'a [TypeSignature]],
        mut index: u32,
        same_kind: impl Fn(&TypeSignature) -> Option<u32>,
    ) -> Option<&'a TypeSignature> {
        let mut result = None;

        for &frame in stack.iter().rev() {
            let Some(bound) = frame.get(index as usize) else {
                return result;
            };
            match same_kind(bound) {
                Some(number) => {
                    result = Some(bound);
                    index = number;
                }
                None => return Some(bound),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    #[test]
    fn test_empty_passthrough() {
        let args = GenericArguments::new();
        assert!(args.is_empty());
        assert_eq!(args.resolve_var(0), None);
        assert_eq!(args.resolve_mvar(0), None);
        assert_eq!(args.resolve(&TypeSignature::GenericParamType(0)), None);
    }

    #[test]
    fn test_resolve_var_bounds() {
        let frame = [TypeSignature::I4, TypeSignature::String];
        let mut args = GenericArguments::new();
        args.push_type_args(&frame);

        assert_eq!(args.resolve_var(0), Some(&TypeSignature::I4));
        assert_eq!(args.resolve_var(1), Some(&TypeSignature::String));
        assert_eq!(args.resolve_var(2), None);
        // The method stack is independent
        assert_eq!(args.resolve_mvar(0), None);
    }

    #[test]
    fn test_top_frame_wins() {
        let outer = [TypeSignature::I4];
        let inner = [TypeSignature::R8];
        let mut args = GenericArguments::new();
        args.push_type_args(&outer);
        args.push_type_args(&inner);

        assert_eq!(args.resolve_var(0), Some(&TypeSignature::R8));
        assert_eq!(args.pop_type_args(), Some(&inner[..]));
        assert_eq!(args.resolve_var(0), Some(&TypeSignature::I4));
    }

    #[test]
    fn test_forwarded_parameter_reaches_outer_frame() {
        // The inner frame forwards !0 to !1 of the enclosing frame
        let outer = [TypeSignature::I4, TypeSignature::String];
        let inner = [TypeSignature::GenericParamType(1)];
        let mut args = GenericArguments::new();
        args.push_type_args(&outer);
        args.push_type_args(&inner);

        assert_eq!(args.resolve_var(0), Some(&TypeSignature::String));
    }

    #[test]
    fn test_forwarded_parameter_without_outer_frame() {
        let inner = [TypeSignature::GenericParamType(3)];
        let mut args = GenericArguments::new();
        args.push_type_args(&inner);

        assert_eq!(args.resolve_var(0), Some(&TypeSignature::GenericParamType(3)));
    }

    #[test]
    fn test_method_var_bound_to_type_var() {
        let types = [TypeSignature::Class(Token(0x0200_0004))];
        let methods = [TypeSignature::GenericParamType(0), TypeSignature::U8];
        let mut args = GenericArguments::new();
        args.push_type_args(&types);
        args.push_method_args(&methods);

        assert_eq!(
            args.resolve(&TypeSignature::GenericParamMethod(0)),
            Some(&TypeSignature::Class(Token(0x0200_0004)))
        );
        assert_eq!(
            args.resolve(&TypeSignature::GenericParamMethod(1)),
            Some(&TypeSignature::U8)
        );
        assert_eq!(args.resolve(&TypeSignature::GenericParamMethod(2)), None);
        assert_eq!(args.resolve(&TypeSignature::I4), None);
    }
}
