//! Operator boilerplate for single-field newtypes.

/// Implements the standard arithmetic traits for a newtype wrapping a numeric value.
///
/// * `binary` covers `Add`-style traits (`Self ⊕ Self -> Self`),
/// * `inplace` covers `AddAssign`-style traits,
/// * `unary` covers `Neg`-style traits.
#[macro_export]
macro_rules! op {
    (binary $newtype:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $newtype {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $newtype:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $newtype {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $newtype:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $newtype {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
