// Shared fixtures for integration tests
use schemaweave_core::schema::{Field, Schema, Table};

/// Posts, users and comments, with relations in both directions
pub fn blog_schema() -> Schema {
    Schema::new()
        .table(
            "Post",
            Table::new()
                .column("text", Field::text("NOT NULL"))
                .column("id", Field::integer("PRIMARY KEY"))
                .column("authorId", Field::integer("NOT NULL"))
                .column("author", Field::relation_one("Post.authorId", "User.id"))
                .column(
                    "comments",
                    Field::relation_many("Post.id", "PostComment.postId"),
                ),
        )
        .table(
            "User",
            Table::new()
                .column("id", Field::integer("PRIMARY KEY"))
                .column("name", Field::text(""))
                .column("age", Field::integer(""))
                .column(
                    "comments",
                    Field::relation_many("User.id", "PostComment.authorId"),
                )
                .column("posts", Field::relation_many("User.id", "Post.authorId")),
        )
        .table(
            "PostComment",
            Table::new()
                .column("authorId", Field::integer(""))
                .column("postId", Field::integer(""))
                .column("text", Field::text(""))
                .column("id", Field::integer("PRIMARY KEY"))
                .column("post", Field::relation_one("PostComment.postId", "Post.id"))
                .column("author", Field::relation_one("PostComment.authorId", "User.id")),
        )
}
