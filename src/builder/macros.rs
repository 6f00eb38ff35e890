//! Macros for declaring state types.

/// Declare an enum of states and implement [`State`](crate::core::State)
/// for it. Each variant's name is its stringified identifier.
///
/// # Example
///
/// ```
/// use fsm_store::core::State;
/// use fsm_store::state_enum;
///
/// state_enum! {
///     pub enum Light {
///         Green,
///         Yellow,
///         Red,
///     }
/// }
///
/// assert_eq!(Light::Yellow.name(), "Yellow");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;
    use std::collections::HashSet;

    state_enum! {
        enum TestState {
            Idle,
            Loading,
            Ready,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Ready.name(), "Ready");
    }

    #[test]
    fn generated_states_are_hashable() {
        let states: HashSet<_> = [TestState::Idle, TestState::Loading, TestState::Idle]
            .into_iter()
            .collect();
        assert_eq!(states.len(), 2);
    }

    #[test]
    fn state_enum_supports_visibility() {
        state_enum! {
            pub enum PublicState {
                A,
                B,
            }
        }

        assert_ne!(PublicState::A, PublicState::B);
    }

    #[test]
    fn generated_states_serialize_by_name() {
        let json = serde_json::to_string(&TestState::Loading).unwrap();
        assert_eq!(json, "\"Loading\"");
    }
}
