//! Plain-text rendering of task details and the task table.

use tasklist_core::Task;

fn completed_mark(completed: bool) -> &'static str {
    if completed {
        "yes"
    } else {
        "no"
    }
}

/// Print one task as a detail block followed by a status line.
pub fn task_detail(task: &Task, message: &str) {
    println!();
    println!("  Id           {}", task.id);
    println!("  Title        {}", task.title);
    if let Some(description) = &task.description {
        println!("  Description  {description}");
    }
    println!("  Completed    {}", completed_mark(task.completed));
    println!();
    println!("Task {} {message}", task.id);
}

/// Print all tasks as an aligned table; a notice when there are none.
pub fn task_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!();
        println!("No tasks have been created yet");
        println!();
        return;
    }

    let id_width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .chain(std::iter::once("Id".len()))
        .max()
        .unwrap_or(2);
    let title_width = tasks
        .iter()
        .map(|t| t.title.chars().count())
        .chain(std::iter::once("Title".len()))
        .max()
        .unwrap_or(5);
    let description_width = tasks
        .iter()
        .map(|t| t.description.as_deref().unwrap_or("").chars().count())
        .chain(std::iter::once("Description".len()))
        .max()
        .unwrap_or(11);

    println!();
    println!(
        "{:>id_width$}  {:<title_width$}  {:<description_width$}  Completed",
        "Id", "Title", "Description"
    );
    for task in tasks {
        println!(
            "{:>id_width$}  {:<title_width$}  {:<description_width$}  {}",
            task.id,
            task.title,
            task.description.as_deref().unwrap_or(""),
            completed_mark(task.completed),
        );
    }
    println!();
}
