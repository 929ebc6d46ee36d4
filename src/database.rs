//! # SQLite
//!
//! Relational store for reference data and bookmarks.
//!
//! ## Schema
//! - `subjects` (id, name): immutable reference data
//! - `streams` (id, name, description): immutable reference data
//! - `valid_combinations` (stream_id, rule_label, subject_a/b/c, triple_key):
//!   admin-curated triple-to-stream rules. `triple_key` is the sorted triple
//!   rendered as `a-b-c` with a UNIQUE index, so the same unordered triple can
//!   never map to two streams. Enforced at write time, not query time.
//! - `courses` (id, name, university, stream_id): degree courses per stream
//! - `saved_courses` (user_ref, course_id, saved_at): bookmark rows, primary
//!   key over (user_ref, course_id) makes the toggle idempotent
//!
//! ## Access pattern
//! Combinations are read once at startup into the in-memory index; everything
//! else is queried per request. Reference data is seeded on startup when
//! `SEED_ON_START` is set (re-seeding is a no-op).

use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::models::{CombinationRow, Course, SavedCourse, Stream, Subject};

pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS streams (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE IF NOT EXISTS valid_combinations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stream_id INTEGER NOT NULL REFERENCES streams(id),
            rule_label TEXT NOT NULL,
            subject_a INTEGER NOT NULL REFERENCES subjects(id),
            subject_b INTEGER NOT NULL REFERENCES subjects(id),
            subject_c INTEGER NOT NULL REFERENCES subjects(id),
            triple_key TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            university TEXT NOT NULL,
            stream_id INTEGER NOT NULL REFERENCES streams(id)
        );
        CREATE TABLE IF NOT EXISTS saved_courses (
            user_ref TEXT NOT NULL,
            course_id INTEGER NOT NULL REFERENCES courses(id),
            saved_at INTEGER NOT NULL,
            PRIMARY KEY (user_ref, course_id)
        );
        "#,
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

// --- Reference data ---

pub async fn list_streams(pool: &SqlitePool) -> Result<Vec<Stream>, sqlx::Error> {
    sqlx::query_as::<_, Stream>("SELECT id, name, description FROM streams ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn list_subjects(pool: &SqlitePool) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn load_combinations(pool: &SqlitePool) -> Result<Vec<CombinationRow>, sqlx::Error> {
    sqlx::query_as::<_, CombinationRow>(
        r#"
        SELECT c.id, c.stream_id, s.name AS stream_name, c.rule_label,
               c.subject_a, c.subject_b, c.subject_c
        FROM valid_combinations c
        JOIN streams s ON s.id = c.stream_id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await
}

fn triple_key(subject_ids: [i64; 3]) -> (String, [i64; 3]) {
    let mut ids = subject_ids;
    ids.sort_unstable();
    (format!("{}-{}-{}", ids[0], ids[1], ids[2]), ids)
}

/// Inserts a combination rule. Fails on a triple that already has a rule,
/// regardless of the order the ids were given in.
pub async fn insert_combination(
    pool: &SqlitePool,
    stream_id: i64,
    rule_label: &str,
    subject_ids: [i64; 3],
) -> Result<(), sqlx::Error> {
    let (key, ids) = triple_key(subject_ids);

    sqlx::query(
        r#"
        INSERT INTO valid_combinations (stream_id, rule_label, subject_a, subject_b, subject_c, triple_key)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(stream_id)
    .bind(rule_label)
    .bind(ids[0])
    .bind(ids[1])
    .bind(ids[2])
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}

// --- Courses & bookmarks ---

pub async fn courses_for_stream(
    pool: &SqlitePool,
    stream_id: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, name, university, stream_id FROM courses WHERE stream_id = ? ORDER BY id",
    )
    .bind(stream_id)
    .fetch_all(pool)
    .await
}

pub async fn course_exists(pool: &SqlitePool, course_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?)")
        .bind(course_id)
        .fetch_one(pool)
        .await
}

/// Bookmarks a course. Saving the same course twice is a no-op that keeps
/// the original `saved_at`.
pub async fn save_course(
    pool: &SqlitePool,
    user_ref: &str,
    course_id: i64,
) -> Result<SavedCourse, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO saved_courses (user_ref, course_id, saved_at) VALUES (?, ?, ?)")
        .bind(user_ref)
        .bind(course_id)
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

    sqlx::query_as::<_, SavedCourse>(
        "SELECT user_ref, course_id, saved_at FROM saved_courses WHERE user_ref = ? AND course_id = ?",
    )
    .bind(user_ref)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

/// Removes a bookmark. Returns whether a row was actually deleted.
pub async fn remove_saved_course(
    pool: &SqlitePool,
    user_ref: &str,
    course_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_courses WHERE user_ref = ? AND course_id = ?")
        .bind(user_ref)
        .bind(course_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn saved_courses_for_user(
    pool: &SqlitePool,
    user_ref: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT c.id, c.name, c.university, c.stream_id
        FROM saved_courses sc
        JOIN courses c ON c.id = sc.course_id
        WHERE sc.user_ref = ?
        ORDER BY sc.saved_at, c.id
        "#,
    )
    .bind(user_ref)
    .fetch_all(pool)
    .await
}

// --- Seed data ---

const SEED_SUBJECTS: &[(i64, &str)] = &[
    (1, "Combined Mathematics"),
    (2, "Physics"),
    (3, "Chemistry"),
    (4, "Biology"),
    (5, "Agricultural Science"),
    (6, "ICT"),
    (7, "Accounting"),
    (8, "Economics"),
    (9, "Business Studies"),
    (10, "Engineering Technology"),
    (11, "Science for Technology"),
    (12, "Geography"),
    (13, "Logic and Scientific Method"),
];

const SEED_STREAMS: &[(i64, &str, &str)] = &[
    (
        1,
        "Physical Science Stream",
        "Mathematics-centred science track leading to engineering and physical sciences",
    ),
    (
        2,
        "Biological Science Stream",
        "Biology-centred science track leading to medicine and life sciences",
    ),
    (
        3,
        "Commerce Stream",
        "Business track leading to management, accounting and finance",
    ),
    (
        4,
        "Technology Stream",
        "Applied technology track leading to engineering technology degrees",
    ),
    (
        5,
        "Arts Stream",
        "Humanities and social sciences track",
    ),
];

const SEED_COMBINATIONS: &[(i64, &str, [i64; 3])] = &[
    (1, "combined-maths-physics-chemistry", [1, 2, 3]),
    (2, "physics-chemistry-biology", [2, 3, 4]),
    (2, "chemistry-biology-agriculture", [3, 4, 5]),
    (3, "accounting-economics-business-studies", [7, 8, 9]),
    (4, "engtech-scitech-ict", [6, 10, 11]),
    (5, "economics-geography-logic", [8, 12, 13]),
];

const SEED_COURSES: &[(i64, &str, &str, i64)] = &[
    (1, "Engineering", "University of Moratuwa", 1),
    (2, "Computer Science", "University of Colombo", 1),
    (3, "Physical Science", "University of Peradeniya", 1),
    (4, "Medicine", "University of Colombo", 2),
    (5, "Dental Surgery", "University of Peradeniya", 2),
    (6, "Agriculture", "University of Ruhuna", 2),
    (7, "Management", "University of Sri Jayewardenepura", 3),
    (8, "Commerce", "University of Kelaniya", 3),
    (9, "Engineering Technology", "University of Jaffna", 4),
    (10, "Arts", "University of Peradeniya", 5),
];

/// Seeds reference data. Safe to run on every startup: existing rows are
/// left untouched.
pub async fn seed_reference_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (id, name) in SEED_SUBJECTS {
        sqlx::query("INSERT OR IGNORE INTO subjects (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    for (id, name, description) in SEED_STREAMS {
        sqlx::query("INSERT OR IGNORE INTO streams (id, name, description) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
    }

    for (stream_id, rule_label, subject_ids) in SEED_COMBINATIONS {
        let (key, ids) = triple_key(*subject_ids);

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO valid_combinations
                (stream_id, rule_label, subject_a, subject_b, subject_c, triple_key)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stream_id)
        .bind(rule_label)
        .bind(ids[0])
        .bind(ids[1])
        .bind(ids[2])
        .bind(key)
        .execute(pool)
        .await?;
    }

    for (id, name, university, stream_id) in SEED_COURSES {
        sqlx::query("INSERT OR IGNORE INTO courses (id, name, university, stream_id) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(university)
            .bind(stream_id)
            .execute(pool)
            .await?;
    }

    info!("Reference data seeded");

    Ok(())
}
