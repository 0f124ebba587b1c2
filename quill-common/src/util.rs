use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
#[error("{name} must be at least 1, got {value}")]
pub struct InvalidPagingValueError {
    name: &'static str,
    value: u32,
}

macro_rules! paging_value {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub struct $name(u32);

        impl $name {
            #[must_use]
            pub const fn new(value: u32) -> Option<Self> {
                if value == 0 { None } else { Some(Self(value)) }
            }

            #[must_use]
            pub const fn new_unchecked(value: u32) -> Self {
                match Self::new(value) {
                    Some(this) => this,
                    None => panic!(concat!(stringify!($name), " must be at least 1.")),
                }
            }

            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl TryFrom<u32> for $name {
            type Error = InvalidPagingValueError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(InvalidPagingValueError {
                    name: stringify!($name),
                    value,
                })
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

paging_value!(PageNumber);
paging_value!(PageSize);

impl PageNumber {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }
}

/// One page worth of a paginated collection, as sent in `page`/`pageSize`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: PageNumber,
    pub page_size: PageSize,
}

impl PageRequest {
    #[must_use]
    pub fn first(page_size: PageSize) -> Self {
        Self {
            page: PageNumber::FIRST,
            page_size,
        }
    }

    /// Number of entries covered by this page and every page before it.
    #[must_use]
    pub fn end_offset(self) -> u64 {
        u64::from(self.page.get()) * u64::from(self.page_size.get())
    }
}

#[must_use]
pub fn page_count(total: u64, page_size: PageSize) -> u64 {
    total.div_ceil(u64::from(page_size.get()))
}

#[cfg(test)]
mod tests {
    use crate::util::{PageNumber, PageRequest, PageSize, page_count};

    #[test]
    fn zero_is_rejected() {
        assert!(PageNumber::new(0).is_none());
        assert!(PageSize::new(0).is_none());
        assert!(PageSize::try_from(0).is_err());
        assert!(serde_json::from_str::<PageSize>("0").is_err());
        assert_eq!(serde_json::from_str::<PageSize>("8").unwrap().get(), 8);
    }

    #[test]
    fn next_page() {
        assert_eq!(PageNumber::FIRST.next(), PageNumber::new_unchecked(2));
        assert!(PageNumber::FIRST.is_first());
        assert!(!PageNumber::new_unchecked(3).is_first());
    }

    #[test]
    fn page_counts() {
        let eight = PageSize::new_unchecked(8);
        assert_eq!(page_count(0, eight), 0);
        assert_eq!(page_count(1, eight), 1);
        assert_eq!(page_count(8, eight), 1);
        assert_eq!(page_count(9, eight), 2);
    }

    #[test]
    fn end_offset() {
        let request = PageRequest {
            page: PageNumber::new_unchecked(3),
            page_size: PageSize::new_unchecked(5),
        };
        assert_eq!(request.end_offset(), 15);
        assert_eq!(PageRequest::first(PageSize::new_unchecked(5)).end_offset(), 5);
    }
}
