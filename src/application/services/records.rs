//! Record tree service
//!
//! Owns the tree together with its collaborators: the console that asks
//! the user for values and the store the tree is loaded from and saved to.

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{
    run_edit, ApplicationError, ApplicationResult, EditOutcome, IoResultExt,
};
use crate::config::Settings;
use crate::domain::{
    Criterion, DeleteMode, Node, Record, RecordTree, Removal, RenderMode, TreeNodeConvert,
};
use crate::infrastructure::traits::{Console, RecordStore};

/// Structural choices applied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreePolicy {
    pub delete_mode: DeleteMode,
    pub reposition_on_edit: bool,
}

impl Default for TreePolicy {
    fn default() -> Self {
        Self {
            delete_mode: DeleteMode::Splice,
            reposition_on_edit: true,
        }
    }
}

impl From<&Settings> for TreePolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            delete_mode: settings.delete_mode,
            reposition_on_edit: settings.reposition_on_edit,
        }
    }
}

/// Service for interactive and scripted record management.
pub struct RecordService<R, C, S>
where
    R: Record,
    C: Console<R>,
    S: RecordStore,
{
    tree: RecordTree<R>,
    console: C,
    store: S,
    policy: TreePolicy,
}

impl<R, C, S> RecordService<R, C, S>
where
    R: Record,
    C: Console<R>,
    S: RecordStore,
{
    /// Rebuilds the tree from `store`. An absent store gives an empty tree.
    #[instrument(level = "debug", skip_all)]
    pub fn open(store: S, console: C, policy: TreePolicy) -> ApplicationResult<Self> {
        let location = store.describe();
        let tree = match store.reader().with_store_context("open", &location)? {
            Some(mut reader) => RecordTree::read_from(&mut *reader)?,
            None => RecordTree::new(),
        };
        info!("opened {} with {} records", location, tree.len());
        Ok(Self {
            tree,
            console,
            store,
            policy,
        })
    }

    pub fn tree(&self) -> &RecordTree<R> {
        &self.tree
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> TreePolicy {
        self.policy
    }

    pub fn add(&mut self, value: R) -> u32 {
        self.tree.insert(value)
    }

    /// Prompts for every field in `R::FIELDS` order, then inserts.
    pub fn add_interactive(&mut self) -> ApplicationResult<u32> {
        let mut value = R::blank();
        for field in R::FIELDS {
            let input = self.console.prompt_field(*field).console_err()?;
            value.set_field(input);
        }
        Ok(self.add(value))
    }

    /// Runs an edit session on the first match and commits a save.
    #[instrument(level = "debug", skip(self))]
    pub fn modify(&mut self, criterion: &Criterion<R::Query>) -> ApplicationResult<EditOutcome<R>> {
        let (index, saved) = self
            .tree
            .find_first(criterion)
            .map(|node| (node.index(), node.value().clone()))
            .ok_or_else(|| not_found(criterion))?;

        let Some(value) = run_edit(&mut self.console, saved)? else {
            return Ok(EditOutcome::Discarded);
        };
        let previous = self
            .tree
            .update(index, value, self.policy.reposition_on_edit)
            .ok_or_else(|| ApplicationError::NotFound(format!("index {index}")))?;
        debug!(index, "record updated");
        Ok(EditOutcome::Saved { index, previous })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, criterion: &Criterion<R::Query>) -> ApplicationResult<Removal<R>> {
        self.tree
            .delete(criterion, self.policy.delete_mode)
            .ok_or_else(|| not_found(criterion))
    }

    pub fn find_first(&self, criterion: &Criterion<R::Query>) -> Option<&Node<R>> {
        self.tree.find_first(criterion)
    }

    pub fn find_all(&self, criterion: &Criterion<R::Query>) -> Vec<&Node<R>> {
        self.tree.find_all(criterion)
    }

    pub fn header(&self) -> String {
        format!("{:>5}     {}", "Index", R::table_header())
    }

    pub fn row(node: &Node<R>) -> String {
        format!("{:>5}     {}", node.index(), node.value().render(RenderMode::Short))
    }

    /// Table rows in preorder, all of them or the matches of `criterion`.
    pub fn rows(&self, criterion: Option<&Criterion<R::Query>>) -> Vec<String> {
        self.tree
            .iter()
            .filter(|node| criterion.map_or(true, |c| node.matches(c)))
            .map(Self::row)
            .collect()
    }

    /// Table rows in ascending sort order.
    pub fn sorted_rows(&self) -> Vec<String> {
        self.tree.iter_sorted().map(Self::row).collect()
    }

    /// Writes the header and matching rows to the console. Returns the row count.
    pub fn print(&mut self, criterion: Option<&Criterion<R::Query>>) -> ApplicationResult<usize> {
        let rows = self.rows(criterion);
        let header = self.header();
        self.console.show(&header).console_err()?;
        for row in &rows {
            self.console.show(row).console_err()?;
        }
        Ok(rows.len())
    }

    /// Writes the header and the first match of `criterion`.
    pub fn print_first(&mut self, criterion: &Criterion<R::Query>) -> ApplicationResult<u32> {
        let node = self.tree.find_first(criterion).ok_or_else(|| not_found(criterion))?;
        let (index, row) = (node.index(), Self::row(node));
        let header = self.header();
        self.console.show(&header).console_err()?;
        self.console.show(&row).console_err()?;
        Ok(index)
    }

    pub fn display_tree(&self) -> Tree<String> {
        self.tree.to_tree_string()
    }

    /// Serializes the tree in preorder and replaces the store contents.
    #[instrument(level = "debug", skip(self))]
    pub fn save(&mut self) -> ApplicationResult<usize> {
        let mut buf = Vec::with_capacity(self.tree.len() * R::ENCODED_SIZE);
        let written = self.tree.write_to(&mut buf)?;
        let location = self.store.describe();
        self.store
            .replace(&buf)
            .with_store_context("save", &location)?;
        info!("saved {} records to {}", written, location);
        Ok(written)
    }
}

fn not_found<Q: std::fmt::Debug>(criterion: &Criterion<Q>) -> ApplicationError {
    ApplicationError::NotFound(format!("{criterion:?}"))
}
