use agora_core::api::{Filter, SubjectKindTag, Time, Uuid};

pub enum Bind {
    Uuid(Uuid),
    String(String),
    Time(Time),
}

#[derive(Default)]
pub struct Sql {
    pub where_clause: String,
    pub binds: Vec<Bind>,
}

impl Sql {
    /// Adds a Bind, returning the index that should be used to refer to it assuming the first bind is at index first_bind_idx
    fn add_bind(&mut self, first_bind_idx: usize, b: Bind) -> usize {
        let res = first_bind_idx + self.binds.len();
        self.binds.push(b);
        res
    }
}

/// Escapes `%`, `_` and `\` so that `s` matches literally in a LIKE pattern
fn escape_like(s: &str) -> String {
    let mut res = String::with_capacity(s.len() + 2);
    res.push('%');
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            res.push('\\');
        }
        res.push(c);
    }
    res.push('%');
    res
}

/// Assumes the subjects table is available as `s`
pub fn to_postgres(f: &Filter, first_bind_idx: usize) -> Sql {
    let mut res = Default::default();
    add_to_postgres(f, first_bind_idx, &mut res);
    res
}

fn add_to_postgres(f: &Filter, first_bind_idx: usize, res: &mut Sql) {
    match f {
        Filter::Any(filters) => {
            res.where_clause.push_str("(false");
            for f in filters {
                res.where_clause.push_str(" OR ");
                add_to_postgres(f, first_bind_idx, &mut *res);
            }
            res.where_clause.push(')');
        }
        Filter::All(filters) => {
            res.where_clause.push_str("(true");
            for f in filters {
                res.where_clause.push_str(" AND ");
                add_to_postgres(f, first_bind_idx, &mut *res);
            }
            res.where_clause.push(')');
        }
        Filter::Not(f) => {
            // NULL columns must not make NOT match less than the in-memory evaluation does
            res.where_clause.push_str("NOT COALESCE(");
            add_to_postgres(f, first_bind_idx, &mut *res);
            res.where_clause.push_str(", false)");
        }
        Filter::Kind(SubjectKindTag::Post) => {
            res.where_clause.push_str("(s.post_id IS NULL)");
        }
        Filter::Kind(SubjectKindTag::Comment) => {
            res.where_clause.push_str("(s.post_id IS NOT NULL)");
        }
        Filter::Community(c) => {
            let idx = res.add_bind(first_bind_idx, Bind::Uuid(c.0));
            res.where_clause
                .push_str(&format!("(s.community_id IS NOT NULL AND s.community_id = ${idx})"));
        }
        Filter::Post(p) => {
            let idx = res.add_bind(first_bind_idx, Bind::Uuid(p.0));
            res.where_clause
                .push_str(&format!("(s.post_id IS NOT NULL AND s.post_id = ${idx})"));
        }
        Filter::Parent(None) => {
            res.where_clause
                .push_str("(s.post_id IS NOT NULL AND s.parent_id IS NULL)");
        }
        Filter::Parent(Some(p)) => {
            let idx = res.add_bind(first_bind_idx, Bind::Uuid(p.0));
            res.where_clause
                .push_str(&format!("(s.parent_id IS NOT NULL AND s.parent_id = ${idx})"));
        }
        Filter::Author(u) => {
            let idx = res.add_bind(first_bind_idx, Bind::Uuid(u.0));
            res.where_clause.push_str(&format!("(s.author_id = ${idx})"));
        }
        Filter::CreatedBetween { from, to } => {
            res.where_clause.push_str("(true");
            if let Some(from) = from {
                let idx = res.add_bind(first_bind_idx, Bind::Time(*from));
                res.where_clause
                    .push_str(&format!(" AND s.created_at >= ${idx}"));
            }
            if let Some(to) = to {
                let idx = res.add_bind(first_bind_idx, Bind::Time(*to));
                res.where_clause.push_str(&format!(" AND s.created_at < ${idx}"));
            }
            res.where_clause.push(')');
        }
        Filter::Phrase(t) => {
            let idx = res.add_bind(first_bind_idx, Bind::String(escape_like(t)));
            res.where_clause.push_str(&format!(
                "(s.body ILIKE ${idx} OR COALESCE(s.title ILIKE ${idx}, false))"
            ));
        }
    }
}
