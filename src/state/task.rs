use super::AppState;
use crate::types::*;

impl AppState {
    /// Store a new task
    pub async fn create_task(&self, new_task: NewTask) -> Task {
        let now = chrono::Utc::now();
        let task = Task {
            id: ulid::Ulid::new().to_string(),
            title: new_task.title,
            description: new_task.description,
            assigned_to: new_task.assigned_to,
            due_date: new_task.due_date,
            status: new_task.status,
            tags: new_task.tags,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.push(task.clone());
        task
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    #[cfg(test)]
    pub(crate) async fn get_task(&self, task_id: &str) -> Option<Task> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    /// Set a task's status. Returns None if no task has this id.
    pub async fn update_task_status(&self, task_id: &str, status: String) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.iter_mut().find(|t| t.id == task_id)?;
        task.status = status;
        task.updated_at = chrono::Utc::now();
        Some(task.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_task() {
        let state = AppState::default();
        let task = state.create_task(new_task("Buy milk")).await;

        assert_eq!(task.title, "Buy milk");
        assert!(ulid::Ulid::from_string(&task.id).is_ok());
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(state.get_task(&task.id).await, Some(task));
    }

    #[tokio::test]
    async fn test_list_tasks_in_creation_order() {
        let state = AppState::default();
        for title in ["first", "second", "third"] {
            state.create_task(new_task(title)).await;
        }

        let titles: Vec<_> = state
            .list_tasks()
            .await
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_task_status() {
        let state = AppState::default();
        let task = state.create_task(new_task("Write report")).await;

        let updated = state
            .update_task_status(&task.id, "done".to_string())
            .await
            .unwrap();

        assert_eq!(updated.status, "done");
        assert!(updated.updated_at >= task.updated_at);
        assert_eq!(state.get_task(&task.id).await.unwrap().status, "done");
    }

    #[tokio::test]
    async fn test_update_unknown_task() {
        let state = AppState::default();
        let missing = ulid::Ulid::new().to_string();
        assert!(state
            .update_task_status(&missing, "done".to_string())
            .await
            .is_none());
    }
}
