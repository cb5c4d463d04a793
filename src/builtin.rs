//! Built-in functions
//!
//! Native functions registered into the default namespace. A namespace
//! created with [`Namespace::new`] starts empty; call [`install`] to give it
//! the same set.

use crate::error::Error;
use crate::func::{Definition, NativeFn};
use crate::namespace::Namespace;

/// Name, arity and rule of every built-in
pub static BUILTINS: &[(&str, usize, NativeFn)] = &[
    ("sin", 1, |args| args[0].sin()),
    ("cos", 1, |args| args[0].cos()),
    ("tan", 1, |args| args[0].tan()),
    ("sinh", 1, |args| args[0].sinh()),
    ("cosh", 1, |args| args[0].cosh()),
    ("tanh", 1, |args| args[0].tanh()),
    ("asin", 1, |args| args[0].asin()),
    ("acos", 1, |args| args[0].acos()),
    ("atan", 1, |args| args[0].atan()),
    // atan2(y, x)
    ("atan2", 2, |args| args[0].atan2(args[1])),
    ("exp", 1, |args| args[0].exp()),
    ("ln", 1, |args| args[0].ln()),
    ("log", 1, |args| args[0].log10()),
    // log(base, x)
    ("log", 2, |args| args[1].ln() / args[0].ln()),
    ("ceil", 1, |args| args[0].ceil()),
    ("floor", 1, |args| args[0].floor()),
];

/// Register every built-in into `namespace`
///
/// Fails on the first built-in whose identifier is already taken.
pub fn install(namespace: &Namespace) -> Result<(), Error> {
    BUILTINS
        .iter()
        .map(|(name, arity, rule)| namespace.register(Definition::native(*name, *arity, *rule)))
        .collect::<Result<Vec<_>, Error>>()
        .map(|_| ())
}

#[cfg(test)]
mod test_builtins {
    use super::*;
    use crate::ident::Identifier;
    use std::f64::consts::{E, PI};

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-12
    }

    fn builtin_cases() -> Vec<(&'static str, Vec<f64>, f64)> {
        vec![
            ("sin", vec![PI / 2.0], 1.0),
            ("cos", vec![0.0], 1.0),
            ("tan", vec![PI / 4.0], 1.0),
            ("sinh", vec![0.0], 0.0),
            ("cosh", vec![0.0], 1.0),
            ("tanh", vec![0.0], 0.0),
            ("asin", vec![1.0], PI / 2.0),
            ("acos", vec![1.0], 0.0),
            ("atan", vec![1.0], PI / 4.0),
            ("atan2", vec![1.0, 1.0], PI / 4.0),
            ("atan2", vec![1.0, -1.0], 3.0 * PI / 4.0),
            ("exp", vec![1.0], E),
            ("ln", vec![E], 1.0),
            ("log", vec![1000.0], 3.0),
            ("log", vec![2.0, 8.0], 3.0),
            ("ceil", vec![1.2], 2.0),
            ("floor", vec![1.8], 1.0),
            ("floor", vec![-1.2], -2.0),
        ]
    }

    #[test]
    fn test_builtin_values() {
        let ns = Namespace::new();
        install(&ns).unwrap();
        builtin_cases().into_iter().for_each(|(name, args, exp)| {
            println!("{}({:?})", name, args);
            let ident = Identifier::new(name, args.len());
            assert!(approx(ns.invoke(&ident, &args).unwrap(), exp));
        })
    }

    #[test]
    fn test_install_registers_all() {
        let ns = Namespace::new();
        install(&ns).unwrap();
        assert_eq!(ns.len(), BUILTINS.len());
        assert!(ns.contains(&Identifier::new("floor", 1)));
        assert!(ns.contains(&Identifier::new("ceil", 1)));
    }

    #[test]
    fn test_install_twice_conflicts() {
        let ns = Namespace::new();
        install(&ns).unwrap();
        assert!(install(&ns).is_err());
    }

    #[test]
    fn test_domain_errors_are_nan() {
        let ns = Namespace::new();
        install(&ns).unwrap();
        assert!(ns
            .invoke(&Identifier::new("asin", 1), &[2.0])
            .unwrap()
            .is_nan());
        assert!(ns
            .invoke(&Identifier::new("ln", 1), &[-1.0])
            .unwrap()
            .is_nan());
    }
}
