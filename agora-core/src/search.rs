use anyhow::Context;

use crate::{
    api::{
        validate_limit, CursorPage, Error as ApiError, Filter, ListedSubject, OffsetPage, Page,
        Pagination, Position, SortMode, Store, SubjectId,
    },
    cursor, Error, OrderExt, SortKey, VoteAggregator,
};

/// Returns the `limit` items of the ranked `items` that come right after `after`.
///
/// `items` must already be sorted for `sort`. When no item has exactly the key `after`, for
/// instance because it got deleted or re-scored since the cursor was issued, this resumes at
/// the first item ranked after that key anyway.
pub fn slice_after(
    items: &[ListedSubject],
    sort: SortMode,
    after: Option<&SortKey>,
    limit: u32,
) -> CursorPage {
    let start = match after {
        None => 0,
        Some(key) => {
            let start = items.partition_point(|it| SortKey::of_listed(sort, it) <= *key);
            let exact = start > 0 && SortKey::of_listed(sort, &items[start - 1]) == *key;
            if !exact {
                tracing::debug!(id = ?key.id(), "cursor subject not in listing, seeking past its key");
            }
            start
        }
    };
    let end = items.len().min(start.saturating_add(limit as usize));
    let data = items[start..end].to_vec();
    let next_cursor = match data.last() {
        Some(last) if end < items.len() => Some(cursor::encode(&SortKey::of_listed(sort, last))),
        _ => None,
    };
    CursorPage { data, next_cursor }
}

/// Returns the 1-based `page` of `items`. Pages past the end are empty.
pub fn slice_page(items: &[ListedSubject], page: u32, limit: u32) -> Result<OffsetPage, ApiError> {
    if page == 0 {
        return Err(ApiError::InvalidPage(page));
    }
    if limit == 0 {
        return Err(ApiError::InvalidLimit(limit));
    }
    let records = items.len() as u64;
    let pages = (records + limit as u64 - 1) / limit as u64;
    let skip = (page as u64 - 1) * limit as u64;
    let data = items
        .iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(limit as usize)
        .cloned()
        .collect();
    Ok(OffsetPage {
        data,
        pagination: Pagination {
            current: page,
            limit,
            records,
            pages,
            stable: false,
        },
    })
}

/// Ranks and pages subjects. Holds no state across calls: every listing re-reads the store.
pub struct PaginationOrchestrator<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> PaginationOrchestrator<'s, S> {
    pub fn new(store: &'s S) -> PaginationOrchestrator<'s, S> {
        PaginationOrchestrator { store }
    }

    pub async fn list_subjects(
        &self,
        filter: &Filter,
        sort: SortMode,
        position: &Position,
        limit: Option<u32>,
    ) -> Result<Page, Error> {
        let limit = validate_limit(limit)?;
        filter.validate()?;
        // Reject bad positions before touching the store
        let after = match position {
            Position::Start => None,
            Position::Cursor(c) => Some(cursor::decode(c, sort)?),
            Position::Page(0) => return Err(ApiError::InvalidPage(0).into()),
            Position::Page(_) => None,
        };

        let ranked = self.ranked(filter, sort).await?;
        tracing::debug!(?sort, candidates = ranked.len(), limit, "ranked listing");
        Ok(match position {
            Position::Page(page) => Page::Offset(slice_page(&ranked, *page, limit)?),
            Position::Start | Position::Cursor(_) => {
                Page::Cursor(slice_after(&ranked, sort, after.as_ref(), limit))
            }
        })
    }

    /// Every live subject matching `filter`, in listing order
    pub async fn ranked(
        &self,
        filter: &Filter,
        sort: SortMode,
    ) -> Result<Vec<ListedSubject>, Error> {
        let mut candidates = self
            .store
            .fetch_candidates(filter)
            .await
            .context("fetching listing candidates")?;
        let fetched = candidates.len();
        candidates.retain(|s| !s.is_deleted());
        if candidates.len() != fetched {
            tracing::warn!(
                dropped = fetched - candidates.len(),
                "store returned deleted subjects as candidates"
            );
        }

        let mut items = match sort {
            SortMode::Newest => candidates
                .into_iter()
                .map(|subject| ListedSubject {
                    subject,
                    score: None,
                })
                .collect::<Vec<_>>(),
            SortMode::Top => {
                let ids = candidates.iter().map(|s| s.id).collect::<Vec<SubjectId>>();
                let scores = VoteAggregator::new(self.store)
                    .compute_scores(&ids)
                    .await?;
                candidates
                    .into_iter()
                    .map(|subject| {
                        let score = scores.get(&subject.id).copied().unwrap_or(0);
                        ListedSubject {
                            subject,
                            score: Some(score),
                        }
                    })
                    .collect()
            }
        };
        sort.sort(&mut items);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{CommunityId, Uuid, VoteValue},
        test_util::*,
        MemoryStore,
    };

    fn ids(items: &[ListedSubject]) -> Vec<SubjectId> {
        items.iter().map(|l| l.subject.id).collect()
    }

    fn cursor_page(p: Page) -> CursorPage {
        match p {
            Page::Cursor(p) => p,
            Page::Offset(p) => panic!("expected a cursor page, got {p:?}"),
        }
    }

    fn offset_page(p: Page) -> OffsetPage {
        match p {
            Page::Offset(p) => p,
            Page::Cursor(p) => panic!("expected an offset page, got {p:?}"),
        }
    }

    fn api_err(r: Result<Page, Error>) -> ApiError {
        match r {
            Err(Error::Api(e)) => e,
            r => panic!("expected an api error, got {r:?}"),
        }
    }

    /// Post 1 with `n` top-level comments, comment `100 + i` created at second `i`
    fn thread(n: u128) -> MemoryStore {
        let store = MemoryStore::new();
        let mut subjects = vec![post(1, 0)];
        subjects.extend((0..n).map(|i| comment(100 + i, 1, None, i as i64)));
        store.load(subjects, vec![]);
        store
    }

    #[tokio::test]
    async fn newest_walk_over_a_thread() {
        let store = thread(28);
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::comments_on(sid(1));

        let mut seen = Vec::new();
        let mut position = Position::Start;
        let mut sizes = Vec::new();
        loop {
            let page = cursor_page(
                orch.list_subjects(&filter, SortMode::Newest, &position, Some(10))
                    .await
                    .unwrap(),
            );
            sizes.push(page.data.len());
            assert!(page.data.iter().all(|l| l.score.is_none()));
            seen.extend(ids(&page.data));
            match page.next_cursor {
                Some(c) => position = Position::Cursor(c),
                None => break,
            }
        }
        assert_eq!(sizes, vec![10, 10, 8]);
        let expected = (0..28u128).rev().map(|i| sid(100 + i)).collect::<Vec<_>>();
        assert_eq!(seen, expected);
    }

    #[test]
    fn cursor_walk_is_complete() {
        bolero::check!()
            .with_type::<(Vec<(u8, i8, i8)>, u8, bool)>()
            .cloned()
            .for_each(|(raw, limit, top)| {
                let sort = if top { SortMode::Top } else { SortMode::Newest };
                let limit = limit as u32 % 5 + 1;
                let store = MemoryStore::new();
                let mut votes = Vec::new();
                let subjects = dedup_by_id(raw)
                    .into_iter()
                    .map(|(id, secs, score)| {
                        let value = if score < 0 { VoteValue::Down } else { VoteValue::Up };
                        for voter in 0..(score as i64).unsigned_abs() % 4 {
                            votes.push(vote(id as u128, voter as u128, value, false));
                        }
                        post(id as u128, secs as i64)
                    })
                    .collect::<Vec<_>>();
                let n = subjects.len();
                store.load(subjects, votes);
                let orch = PaginationOrchestrator::new(&store);
                let filter = Filter::posts_in(CommunityId::stub());

                futures::executor::block_on(async {
                    let all = orch.ranked(&filter, sort).await.unwrap();
                    assert_eq!(all.len(), n);
                    let mut walked = Vec::new();
                    let mut position = Position::Start;
                    loop {
                        let page = cursor_page(
                            orch.list_subjects(&filter, sort, &position, Some(limit))
                                .await
                                .unwrap(),
                        );
                        assert!(page.data.len() <= limit as usize);
                        walked.extend(page.data);
                        match page.next_cursor {
                            Some(c) => position = Position::Cursor(c),
                            None => break,
                        }
                    }
                    assert_eq!(walked, all);
                });
            });
    }

    #[tokio::test]
    async fn listings_are_deterministic() {
        let store = thread(15);
        store.load(
            vec![],
            vec![
                vote(103, 1, VoteValue::Up, false),
                vote(107, 1, VoteValue::Down, false),
            ],
        );
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::comments_on(sid(1));
        for sort in [SortMode::Newest, SortMode::Top] {
            let first = orch
                .list_subjects(&filter, sort, &Position::Start, Some(4))
                .await
                .unwrap();
            let again = orch
                .list_subjects(&filter, sort, &Position::Start, Some(4))
                .await
                .unwrap();
            assert_eq!(first, again);
            let c = cursor_page(first).next_cursor.unwrap();
            let next = orch
                .list_subjects(&filter, sort, &Position::Cursor(c.clone()), Some(4))
                .await
                .unwrap();
            let next_again = orch
                .list_subjects(&filter, sort, &Position::Cursor(c), Some(4))
                .await
                .unwrap();
            assert_eq!(next, next_again);
        }
    }

    #[tokio::test]
    async fn top_mode_carries_scores() {
        let store = thread(3);
        store.load(
            vec![],
            vec![
                vote(100, 1, VoteValue::Up, false),
                vote(100, 2, VoteValue::Up, false),
                vote(102, 1, VoteValue::Down, false),
            ],
        );
        let orch = PaginationOrchestrator::new(&store);
        let page = cursor_page(
            orch.list_subjects(
                &Filter::comments_on(sid(1)),
                SortMode::Top,
                &Position::Start,
                None,
            )
            .await
            .unwrap(),
        );
        assert_eq!(ids(&page.data), vec![sid(100), sid(101), sid(102)]);
        let scores = page.data.iter().map(|l| l.score).collect::<Vec<_>>();
        assert_eq!(scores, vec![Some(2), Some(0), Some(-1)]);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn deleted_cursor_subject_resumes_after_it() {
        let store = thread(10);
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::comments_on(sid(1));
        let first = cursor_page(
            orch.list_subjects(&filter, SortMode::Newest, &Position::Start, Some(3))
                .await
                .unwrap(),
        );
        assert_eq!(ids(&first.data), vec![sid(109), sid(108), sid(107)]);

        store.delete_subject(sid(107), at(100));
        let second = cursor_page(
            orch.list_subjects(
                &filter,
                SortMode::Newest,
                &Position::Cursor(first.next_cursor.unwrap()),
                Some(3),
            )
            .await
            .unwrap(),
        );
        assert_eq!(ids(&second.data), vec![sid(106), sid(105), sid(104)]);
    }

    #[tokio::test]
    async fn rescored_cursor_subject_still_moves_forward() {
        let store = thread(6);
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::comments_on(sid(1));
        let first = cursor_page(
            orch.list_subjects(&filter, SortMode::Top, &Position::Start, Some(2))
                .await
                .unwrap(),
        );
        assert_eq!(ids(&first.data), vec![sid(105), sid(104)]);

        // 104 jumps to the top; the next page starts after where it used to be
        store.load(vec![], vec![vote(104, 1, VoteValue::Up, false)]);
        let second = cursor_page(
            orch.list_subjects(
                &filter,
                SortMode::Top,
                &Position::Cursor(first.next_cursor.unwrap()),
                Some(2),
            )
            .await
            .unwrap(),
        );
        assert_eq!(ids(&second.data), vec![sid(103), sid(102)]);
    }

    #[tokio::test]
    async fn bad_positions_fail_before_fetching() {
        let store = FailingStore;
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::All(vec![]);
        assert!(matches!(
            api_err(
                orch.list_subjects(
                    &filter,
                    SortMode::Newest,
                    &Position::Cursor(String::from("%%%")),
                    None
                )
                .await
            ),
            ApiError::MalformedCursor(_)
        ));
        assert_eq!(
            api_err(
                orch.list_subjects(&filter, SortMode::Newest, &Position::Page(0), None)
                    .await
            ),
            ApiError::InvalidPage(0)
        );
        assert_eq!(
            api_err(
                orch.list_subjects(&filter, SortMode::Newest, &Position::Start, Some(101))
                    .await
            ),
            ApiError::InvalidLimit(101)
        );
        assert_eq!(
            api_err(
                orch.list_subjects(
                    &Filter::Phrase(String::from("a\0")),
                    SortMode::Newest,
                    &Position::Start,
                    None
                )
                .await
            ),
            ApiError::NullByteInString(String::from("a\0"))
        );
        assert!(matches!(
            orch.list_subjects(&filter, SortMode::Newest, &Position::Start, None)
                .await,
            Err(Error::Anyhow(_))
        ));
    }

    #[tokio::test]
    async fn cursors_are_bound_to_their_mode() {
        let store = thread(5);
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::comments_on(sid(1));
        let c = cursor_page(
            orch.list_subjects(&filter, SortMode::Top, &Position::Start, Some(2))
                .await
                .unwrap(),
        )
        .next_cursor
        .unwrap();
        assert_eq!(
            api_err(
                orch.list_subjects(&filter, SortMode::Newest, &Position::Cursor(c), Some(2))
                    .await
            ),
            ApiError::MismatchedSortMode {
                expected: SortMode::Newest,
                found: SortMode::Top,
            }
        );
    }

    async fn newest_page(store: &MemoryStore, page: u32) -> OffsetPage {
        let orch = PaginationOrchestrator::new(store);
        offset_page(
            orch.list_subjects(
                &Filter::comments_on(sid(1)),
                SortMode::Newest,
                &Position::Page(page),
                Some(10),
            )
            .await
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn offset_pages() {
        let store = thread(28);
        let third = newest_page(&store, 3).await;
        assert_eq!(
            ids(&third.data),
            (0..8u128).rev().map(|i| sid(100 + i)).collect::<Vec<_>>()
        );
        assert_eq!(
            third.pagination,
            Pagination {
                current: 3,
                limit: 10,
                records: 28,
                pages: 3,
                stable: false,
            }
        );
        let beyond = newest_page(&store, 4).await;
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.pagination.pages, 3);

        // offset pages are cut from the same ranking as cursor pages
        let orch = PaginationOrchestrator::new(&store);
        let cursor_first = cursor_page(
            orch.list_subjects(
                &Filter::comments_on(sid(1)),
                SortMode::Newest,
                &Position::Start,
                Some(10),
            )
            .await
            .unwrap(),
        );
        assert_eq!(newest_page(&store, 1).await.data, cursor_first.data);
    }

    #[tokio::test]
    async fn empty_listings() {
        let store = MemoryStore::new();
        let orch = PaginationOrchestrator::new(&store);
        let filter = Filter::posts_in(CommunityId(Uuid::new_v4()));
        let page = cursor_page(
            orch.list_subjects(&filter, SortMode::Top, &Position::Start, None)
                .await
                .unwrap(),
        );
        assert!(page.data.is_empty());
        assert_eq!(page.next_cursor, None);

        let page = offset_page(
            orch.list_subjects(&filter, SortMode::Top, &Position::Page(1), None)
                .await
                .unwrap(),
        );
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.records, 0);
        assert_eq!(page.pagination.pages, 0);
    }

    #[test]
    fn exact_page_boundary_has_no_cursor() {
        let mut items = (0..4u128)
            .map(|i| listed(post(i, i as i64), None))
            .collect::<Vec<_>>();
        SortMode::Newest.sort(&mut items);
        let first = slice_after(&items, SortMode::Newest, None, 2);
        let key = crate::cursor::decode(first.next_cursor.as_deref().unwrap(), SortMode::Newest)
            .unwrap();
        let second = slice_after(&items, SortMode::Newest, Some(&key), 2);
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.next_cursor, None);
        assert!(!slice_after(&items, SortMode::Newest, None, 4).has_next());
    }
}
