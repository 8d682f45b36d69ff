use crate::{
    MatchRules, ProcessEntry, ProcessHandle, ProcessRole, ProcessSet, ProcessTable, SelfIdentity,
};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use log::{debug, trace};

/// Finds the process tree of the managed server among all host processes.
pub struct ProcessLocator {
    table: Arc<dyn ProcessTable>,
    rules: MatchRules,
    identity: SelfIdentity,
}

impl ProcessLocator {
    pub fn new(table: Arc<dyn ProcessTable>, rules: MatchRules, identity: SelfIdentity) -> Self {
        Self {
            table,
            rules,
            identity,
        }
    }

    /// Scan and classify the host process table.
    ///
    /// Blocking; call from a blocking context.
    pub fn locate(&self) -> ProcessSet {
        let mut entries = self.table.snapshot();
        entries.sort_by_key(|entry| entry.pid);

        let candidates: Vec<&ProcessEntry> = entries
            .iter()
            .filter(|entry| {
                let excluded = self.identity.matches(entry) || self.rules.is_control_plane(entry);
                if excluded {
                    trace!("Excluding control plane process {}", entry.pid);
                }
                !excluded
            })
            .collect();

        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for entry in &candidates {
            if let Some(parent) = entry.parent_pid {
                children.entry(parent).or_default().push(entry.pid);
            }
        }

        let mut roles: HashMap<u32, ProcessRole> = HashMap::new();
        for entry in &candidates {
            if self.rules.is_wrapper(entry) {
                roles.insert(entry.pid, ProcessRole::ShellWrapper);
            } else if self.rules.is_server_binary(entry) {
                roles.insert(entry.pid, ProcessRole::ServerBinary);
            }
        }

        // Everything below a tagged process that is not itself tagged
        let mut queue: VecDeque<u32> = candidates
            .iter()
            .filter(|entry| roles.contains_key(&entry.pid))
            .map(|entry| entry.pid)
            .collect();
        let mut visited: HashSet<u32> = queue.iter().copied().collect();
        let mut descendant_order = Vec::new();
        while let Some(pid) = queue.pop_front() {
            for child in children.get(&pid).into_iter().flatten() {
                if visited.insert(*child) {
                    if !roles.contains_key(child) {
                        roles.insert(*child, ProcessRole::Descendant);
                        descendant_order.push(*child);
                    }
                    queue.push_back(*child);
                }
            }
        }

        let by_pid: HashMap<u32, &ProcessEntry> =
            candidates.iter().map(|entry| (entry.pid, *entry)).collect();
        let handle_for = |pid: u32, role: ProcessRole| {
            by_pid.get(&pid).map(|entry| {
                ProcessHandle::from_entry(entry, role, children.get(&pid).cloned().unwrap_or_default())
            })
        };

        let mut handles: Vec<ProcessHandle> = candidates
            .iter()
            .filter_map(|entry| match roles.get(&entry.pid) {
                Some(role @ (ProcessRole::ShellWrapper | ProcessRole::ServerBinary)) => {
                    handle_for(entry.pid, *role)
                }
                _ => None,
            })
            .collect();
        handles.extend(
            descendant_order
                .into_iter()
                .filter_map(|pid| handle_for(pid, ProcessRole::Descendant)),
        );

        let set = ProcessSet::new(handles);
        debug!(
            "Located {} server process(es) among {} host processes, binary pid {:?}",
            set.len(),
            entries.len(),
            set.server_pid()
        );
        set
    }
}
