//! Timeline service.
//!
//! All four feeds share one ordering, newest first with id as tiebreak,
//! and one pagination scheme. Each feed counts its matching posts,
//! clamps the requested page into range, then fetches exactly one page.

use crate::pagination::{self, PAGE_SIZE, Page};
use zapis_common::AppResult;
use zapis_db::entities::{comment, group, post, user};
use zapis_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// An author's feed page, with the profile context the page is shown in.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    /// The profile owner.
    pub author: user::Model,
    /// One page of their posts.
    pub page: Page<post::Model>,
    /// Their lifetime post count.
    pub post_count: u64,
    /// Whether the viewer follows the author. `false` when anonymous or
    /// viewing their own profile.
    pub following: bool,
}

/// A single post with everything its detail view shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    /// The post itself.
    pub post: post::Model,
    /// Its author.
    pub author: user::Model,
    /// All comments, newest first.
    pub comments: Vec<comment::Model>,
    /// The author's lifetime post count.
    pub author_post_count: u64,
}

/// Timeline service.
#[derive(Clone)]
pub struct TimelineService {
    posts: PostRepository,
    groups: GroupRepository,
    users: UserRepository,
    comments: CommentRepository,
    follows: FollowRepository,
}

impl TimelineService {
    /// Create a new timeline service.
    #[must_use]
    pub const fn new(
        posts: PostRepository,
        groups: GroupRepository,
        users: UserRepository,
        comments: CommentRepository,
        follows: FollowRepository,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            comments,
            follows,
        }
    }

    /// Every post on the site, newest first.
    pub async fn global_feed(&self, requested_page: u64) -> AppResult<Page<post::Model>> {
        let total = self.posts.count_all().await?;
        let index = clamp(requested_page, total);
        let items = self.posts.fetch_page_all(index - 1, PAGE_SIZE).await?;
        Ok(Page::new(items, index, total))
    }

    /// Posts published into one group, newest first.
    pub async fn group_feed(
        &self,
        slug: &str,
        requested_page: u64,
    ) -> AppResult<(group::Model, Page<post::Model>)> {
        let group = self.groups.get_by_slug(slug).await?;
        let total = self.posts.count_by_group(&group.id).await?;
        let index = clamp(requested_page, total);
        let items = self
            .posts
            .fetch_page_by_group(&group.id, index - 1, PAGE_SIZE)
            .await?;
        Ok((group, Page::new(items, index, total)))
    }

    /// One author's posts, newest first, with profile context.
    pub async fn author_feed(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
        requested_page: u64,
    ) -> AppResult<AuthorFeed> {
        let author = self.users.get_by_username(username).await?;
        let total = self.posts.count_by_author(&author.id).await?;
        let index = clamp(requested_page, total);
        let items = self
            .posts
            .fetch_page_by_author(&author.id, index - 1, PAGE_SIZE)
            .await?;

        let following = match viewer {
            Some(v) if v.id != author.id => self.follows.is_following(&v.id, &author.id).await?,
            _ => false,
        };

        Ok(AuthorFeed {
            author,
            page: Page::new(items, index, total),
            post_count: total,
            following,
        })
    }

    /// Posts by every author the viewer follows, newest first.
    pub async fn followed_feed(
        &self,
        viewer: &user::Model,
        requested_page: u64,
    ) -> AppResult<Page<post::Model>> {
        let author_ids = self.follows.following_ids(&viewer.id).await?;
        let total = self.posts.count_by_authors(&author_ids).await?;
        let index = clamp(requested_page, total);
        let items = self
            .posts
            .fetch_page_by_authors(&author_ids, index - 1, PAGE_SIZE)
            .await?;
        Ok(Page::new(items, index, total))
    }

    /// Load one post with its author, comments, and author post count.
    pub async fn single_post(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.posts.get_by_id(post_id).await?;
        let author = self.users.get_by_id(&post.user_id).await?;
        let comments = self.comments.find_by_post(&post.id).await?;
        let author_post_count = self.posts.count_by_author(&author.id).await?;

        Ok(PostDetail {
            post,
            author,
            comments,
            author_post_count,
        })
    }
}

fn clamp(requested_page: u64, total_items: u64) -> u64 {
    pagination::clamp_page(requested_page, pagination::total_pages(total_items))
}
