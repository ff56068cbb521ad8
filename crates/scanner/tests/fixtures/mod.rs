#![allow(dead_code)]

use cmb_scanner::{NativeBridge, NativeCallback, NativeCommand, NativeReply, Scanner};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Registration actions whose callback the native side keeps.
pub const EVENT_ACTIONS: [&str; 4] = [
    "didReceiveReadResultFromReaderCallback",
    "availabilityDidChangeOfReaderCallback",
    "connectionStateDidChangeOfReaderCallback",
    "setActiveStartScanningCallback",
];

/// How the mock answers one command.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed(Value),
    Fail(Value),
    /// Keeps the callback and never answers.
    Hang,
    /// Drops the callback without answering.
    Drop,
    /// Answers twice; only the first answer may count.
    Twice(NativeReply, NativeReply),
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<NativeCommand>,
    scripts: FxHashMap<&'static str, VecDeque<Script>>,
    defaults: FxHashMap<&'static str, Script>,
    registrations: FxHashMap<&'static str, NativeCallback>,
    hung: Vec<NativeCallback>,
}

/// Records every native call and answers from per-command scripts (default: success `null`).
#[derive(Debug, Clone, Default)]
pub struct MockBridge {
    state: Arc<Mutex<MockState>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot answer for the next call of `name`.
    pub fn once(&self, name: &'static str, script: Script) -> &Self {
        self.state.lock().scripts.entry(name).or_default().push_back(script);
        self
    }

    /// Answer used for `name` once its queue is empty.
    pub fn always(&self, name: &'static str, script: Script) -> &Self {
        self.state.lock().defaults.insert(name, script);
        self
    }

    pub fn calls(&self) -> Vec<NativeCommand> {
        self.state.lock().calls.clone()
    }

    /// Calls excluding event registrations.
    pub fn commands(&self) -> Vec<NativeCommand> {
        self.calls().into_iter().filter(|c| !EVENT_ACTIONS.contains(&c.name)).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| c.name == name).count()
    }

    /// Fires a native event on a registered callback. Returns `false` if none is registered.
    pub fn emit(&self, registration: &str, reply: NativeReply) -> bool {
        let callback = self.state.lock().registrations.get(registration).cloned();
        callback.map(|cb| cb.reply(reply)).is_some()
    }

    /// Answers every hung call with `payload`.
    pub fn release_hung(&self, payload: Value) {
        let hung = std::mem::take(&mut self.state.lock().hung);
        for callback in hung {
            callback.success(payload.clone());
        }
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::builder().bridge(self.clone()).build()
    }
}

impl NativeBridge for MockBridge {
    fn exec(&self, command: NativeCommand, callback: NativeCallback) {
        let name = command.name;
        let script = {
            let mut state = self.state.lock();
            state.calls.push(command);

            if EVENT_ACTIONS.contains(&name) {
                state.registrations.insert(name, callback);
                return;
            }

            let queued = state.scripts.get_mut(name).and_then(VecDeque::pop_front);
            queued
                .or_else(|| state.defaults.get(name).cloned())
                .unwrap_or(Script::Succeed(Value::Null))
        };

        match script {
            Script::Succeed(payload) => callback.success(payload),
            Script::Fail(payload) => callback.error(payload),
            Script::Hang => self.state.lock().hung.push(callback),
            Script::Drop => drop(callback),
            Script::Twice(first, second) => {
                callback.reply(first);
                callback.reply(second);
            },
        }
    }
}
