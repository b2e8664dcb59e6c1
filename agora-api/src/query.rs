use crate::{CommunityId, Error, SubjectId, Time, UserId};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum SubjectKindTag {
    Post,
    Comment,
}

/// Which subjects a listing covers. Interpreted by the store, never by the ranking engine.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Filter {
    Any(Vec<Filter>),
    All(Vec<Filter>),
    Not(Box<Filter>),
    Kind(SubjectKindTag),
    Community(CommunityId),

    /// Comments attached to this post
    Post(SubjectId),

    /// Comments replying to this comment, or top-level comments for None
    Parent(Option<SubjectId>),
    Author(UserId),

    /// `from` is inclusive, `to` exclusive
    CreatedBetween {
        from: Option<Time>,
        to: Option<Time>,
    },
    Phrase(String), // case-insensitive match against title and body
}

impl Filter {
    pub fn posts_in(community: CommunityId) -> Filter {
        Filter::All(vec![
            Filter::Kind(SubjectKindTag::Post),
            Filter::Community(community),
        ])
    }

    pub fn comments_on(post: SubjectId) -> Filter {
        Filter::All(vec![Filter::Kind(SubjectKindTag::Comment), Filter::Post(post)])
    }

    pub fn replies_to(post: SubjectId, parent: Option<SubjectId>) -> Filter {
        Filter::All(vec![
            Filter::Kind(SubjectKindTag::Comment),
            Filter::Post(post),
            Filter::Parent(parent),
        ])
    }

    /// Adds `f` as an additional constraint
    pub fn and(self, f: Filter) -> Filter {
        match self {
            Filter::All(mut v) => {
                v.push(f);
                Filter::All(v)
            }
            s => Filter::All(vec![s, f]),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Filter::Any(filters) => {
                for f in filters {
                    f.validate()?;
                }
                Ok(())
            }
            Filter::All(filters) => {
                for f in filters {
                    f.validate()?;
                }
                Ok(())
            }
            Filter::Not(f) => f.validate(),
            Filter::Kind(_) => Ok(()),
            Filter::Community(_) => Ok(()),
            Filter::Post(_) => Ok(()),
            Filter::Parent(_) => Ok(()),
            Filter::Author(_) => Ok(()),
            Filter::CreatedBetween { from: _, to: _ } => Ok(()),
            Filter::Phrase(s) => crate::validate_string(s),
        }
    }
}
