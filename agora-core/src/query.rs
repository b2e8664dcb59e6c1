use crate::api::{Filter, Subject, SubjectKind, SubjectKindTag};

pub trait FilterExt {
    fn matches(&self, s: &Subject) -> bool;
}

impl FilterExt for Filter {
    fn matches(&self, s: &Subject) -> bool {
        match self {
            Filter::Any(filters) => filters.iter().any(|f| f.matches(s)),
            Filter::All(filters) => filters.iter().all(|f| f.matches(s)),
            Filter::Not(f) => !f.matches(s),
            Filter::Kind(SubjectKindTag::Post) => !s.is_comment(),
            Filter::Kind(SubjectKindTag::Comment) => s.is_comment(),
            Filter::Community(c) => s.community_id() == Some(*c),
            Filter::Post(p) => matches!(s.kind, SubjectKind::Comment { post, .. } if post == *p),
            Filter::Parent(p) => s.is_comment() && s.parent_id() == *p,
            Filter::Author(u) => s.author == *u,
            Filter::CreatedBetween { from, to } => {
                from.map_or(true, |from| s.created_at >= from)
                    && to.map_or(true, |to| s.created_at < to)
            }
            Filter::Phrase(p) => {
                let p = p.to_lowercase();
                s.body.to_lowercase().contains(&p)
                    || s.title().map_or(false, |t| t.to_lowercase().contains(&p))
            }
        }
    }
}
