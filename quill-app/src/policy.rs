//! How each kind of resource keeps its local collection in sync after a
//! successful mutation.
//!
//! | Entity  | Policy         |
//! |---------|----------------|
//! | Post    | `Refetch`      |
//! | Comment | `PatchInPlace` |
//!
//! Posts are listed page by page with a server-side filter, so the listing
//! is fetched again. Comments are accumulated across pages, so the changed
//! entry is inserted, replaced or removed by id.

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Entity {
    Post,
    Comment,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum MutationPolicy {
    Refetch,
    PatchInPlace,
}

impl Entity {
    #[must_use]
    pub const fn mutation_policy(self) -> MutationPolicy {
        match self {
            Entity::Post => MutationPolicy::Refetch,
            Entity::Comment => MutationPolicy::PatchInPlace,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::policy::{Entity, MutationPolicy};

    #[test]
    fn policy_table() {
        assert_eq!(Entity::Post.mutation_policy(), MutationPolicy::Refetch);
        assert_eq!(
            Entity::Comment.mutation_policy(),
            MutationPolicy::PatchInPlace
        );
    }
}
