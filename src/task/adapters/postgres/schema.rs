//! Diesel schema for task board persistence.

diesel::table! {
    /// Board columns. Rows are owned by the column collaborator; this crate
    /// only reads and locks them.
    columns (id) {
        /// Column identifier.
        id -> BigInt,
        /// Owning board identifier.
        board_id -> BigInt,
        /// Column display name.
        #[max_length = 100]
        name -> Varchar,
        /// Column position on its board.
        position -> Integer,
    }
}

diesel::table! {
    /// Task records with ordering, timer, and lifecycle state.
    tasks (id) {
        /// Task identifier.
        id -> BigInt,
        /// Owning column, null while the task is column-less.
        column_id -> Nullable<BigInt>,
        /// Position within the owning column.
        sort_order -> Integer,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Free-form description.
        description -> Nullable<Text>,
        /// Image reference held by file storage.
        #[max_length = 255]
        image -> Nullable<Varchar>,
        /// Assigned user.
        assignee_id -> Nullable<BigInt>,
        /// Target project role.
        role_id -> Nullable<BigInt>,
        /// Priority level.
        priority_id -> Nullable<BigInt>,
        /// Due date.
        due_date -> Nullable<Date>,
        /// Assignment timestamp.
        assigned_at -> Nullable<Timestamptz>,
        /// First work timestamp.
        started_at -> Nullable<Timestamptz>,
        /// Latest report submission timestamp.
        submitted_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Completion flag.
        is_completed -> Bool,
        /// Accumulated work in whole seconds.
        work_seconds -> BigInt,
        /// Start of the open timer session.
        timer_started_at -> Nullable<Timestamptz>,
        /// Timer running flag.
        is_timer_running -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tag attachments of tasks.
    task_tags (task_id, tag_id) {
        /// Tagged task.
        task_id -> BigInt,
        /// Attached tag.
        tag_id -> BigInt,
    }
}

diesel::table! {
    /// Subtasks, cascade-deleted with their task.
    subtasks (id) {
        /// Subtask identifier.
        id -> BigInt,
        /// Parent task.
        task_id -> BigInt,
        /// Subtask title.
        #[max_length = 100]
        title -> Varchar,
        /// Completion flag.
        is_completed -> Bool,
        /// Position within the parent task.
        sort_order -> Integer,
    }
}

diesel::joinable!(tasks -> columns (column_id));
diesel::joinable!(task_tags -> tasks (task_id));
diesel::joinable!(subtasks -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(columns, tasks, task_tags, subtasks);
