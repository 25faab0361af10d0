use serde::Serialize;

use crate::protocol::ResourceContents;

/// A fixed document served under the `tolk://` scheme.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticResource {
  pub uri: &'static str,
  pub name: &'static str,
  pub description: &'static str,
  pub mime_type: &'static str,
  #[serde(skip)]
  pub text: &'static str,
}

impl StaticResource {
  pub fn contents(&self) -> ResourceContents {
    ResourceContents {
      uri: self.uri,
      mime_type: self.mime_type,
      text: self.text,
    }
  }
}

pub const RESOURCES: &[StaticResource] = &[
  StaticResource {
    uri: "tolk://docs/language-reference",
    name: "Tolk language reference",
    description: "Syntax, types, standard library entry points and contract structure",
    mime_type: "text/markdown",
    text: LANGUAGE_REFERENCE,
  },
  StaticResource {
    uri: "tolk://examples/hello-world",
    name: "Hello world contract",
    description: "Minimal contract with an empty message handler and one get-method",
    mime_type: "text/plain",
    text: HELLO_WORLD,
  },
  StaticResource {
    uri: "tolk://examples/counter",
    name: "Counter contract",
    description: "Persistent counter with an increment message and a getter",
    mime_type: "text/plain",
    text: COUNTER,
  },
  StaticResource {
    uri: "tolk://examples/multi-file",
    name: "Multi-file project",
    description: "Entrypoint importing helpers from a sibling file",
    mime_type: "text/plain",
    text: MULTI_FILE,
  },
  StaticResource {
    uri: "tolk://examples/message-handling",
    name: "Message handling",
    description: "Owner-checked operations, bounced messages and outgoing transfers",
    mime_type: "text/plain",
    text: MESSAGE_HANDLING,
  },
];

pub fn list() -> &'static [StaticResource] {
  RESOURCES
}

pub fn read(uri: &str) -> Option<ResourceContents> {
  RESOURCES
    .iter()
    .find(|resource| resource.uri == uri)
    .map(StaticResource::contents)
}

const LANGUAGE_REFERENCE: &str = r#"# Tolk language reference

Tolk is a statically typed language for TON smart contracts. It compiles to
Fift assembly, which is assembled into a BoC (bag of cells) holding the
contract code.

## Files and imports

- Source files use the `.tolk` extension.
- `import "./utils.tolk";` pulls in another file of the project.
- `import "@stdlib/tvm-dicts";` pulls in an optional standard library module.
  `@stdlib/common` is always available and needs no import.

## Functions

```tolk
fun add(a: int, b: int): int {
    return a + b;
}

// Called with the receiver as `self`: `c.isEmptyCell()`
fun isEmptyCell(self: cell): bool {
    return self.beginParse().isEndOfSlice();
}

// Exposed to off-chain callers, read-only
get fun total(): int {
    return add(1, 2);
}
```

## Variables and constants

```tolk
const MAX_SUPPLY = 1000000;

fun demo() {
    var counter: int = 0;   // mutable
    val limit = 10;         // immutable
    var (a, b) = (1, 2);    // tensor destructuring
    counter += limit;
}
```

## Types

| Type      | Meaning                                  |
|-----------|------------------------------------------|
| `int`     | 257-bit signed integer                   |
| `bool`    | `true` / `false`                         |
| `cell`    | immutable tree node holding data         |
| `slice`   | read cursor over a cell                  |
| `builder` | write cursor producing a cell            |
| `tuple`   | TVM tuple                                |
| `(A, B)`  | tensor of several stack values           |
| `T?`      | nullable `T`                             |
| `void`    | no value                                 |

## Control flow

```tolk
if (x > 0) { ... } else if (x < 0) { ... } else { ... }
while (i < 10) { i += 1; }
do { i -= 1; } while (i > 0);
repeat (5) { ... }
try { ... } catch (excNo) { ... }
assert (sender == owner) throw 401;
throw 0xFFFF;
```

## Cells and serialization

```tolk
val data = beginCell()
    .storeUint(counter, 64)
    .storeAddress(owner)
    .endCell();

var cs = data.beginParse();
val counter = cs.loadUint(64);
val owner = cs.loadAddress();
```

## Contract structure

- `fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice)`
  handles incoming internal messages.
- `fun onExternalMessage(inMsg: slice)` handles external messages.
- `fun onBouncedMessage(in: InMessageBounced)` handles bounced messages where
  supported.
- `getContractData()` / `setContractData(c)` read and write persistent storage.
- `get fun` declarations are the contract's get-methods.

## Common exit codes

| Code    | Meaning                        |
|---------|--------------------------------|
| 0       | success                        |
| 401     | conventional "not authorized"  |
| 0xFFFF  | conventional "unknown op"      |
"#;

const HELLO_WORLD: &str = r#"fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice) {
}

get fun hello(): int {
    return 42;
}
"#;

const COUNTER: &str = r#"const OP_INCREMENT = 0x7e8764ef;

fun loadCounter(): int {
    var ds = getContractData().beginParse();
    return ds.loadUint(64);
}

fun saveCounter(counter: int) {
    setContractData(beginCell().storeUint(counter, 64).endCell());
}

fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice) {
    if (msgBody.isEndOfSlice()) {
        return;
    }

    val op = msgBody.loadUint(32);
    if (op == OP_INCREMENT) {
        val queryId = msgBody.loadUint(64);
        val increaseBy = msgBody.loadUint(32);
        saveCounter(loadCounter() + increaseBy);
        return;
    }

    throw 0xFFFF;
}

get fun currentCounter(): int {
    return loadCounter();
}
"#;

const MULTI_FILE: &str = r#"// ---- main.tolk ----
import "./math.tolk";

fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice) {
}

get fun doubled(): int {
    return double(21);
}

// ---- math.tolk ----
fun double(x: int): int {
    return x * 2;
}

// compile_tolk arguments:
// {
//   "entrypointFileName": "main.tolk",
//   "sources": { "main.tolk": "...", "math.tolk": "..." }
// }
"#;

const MESSAGE_HANDLING: &str = r#"const OP_WITHDRAW = 0x2a;
const ERR_NOT_OWNER = 401;

fun loadOwner(): slice {
    return getContractData().beginParse().loadAddress();
}

fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice) {
    var cs = msgFull.beginParse();
    val flags = cs.loadMessageFlags();
    if (isMessageBounced(flags)) {
        return;
    }
    val sender = cs.loadAddress();

    if (msgBody.isEndOfSlice()) {
        return; // plain top-up
    }

    val op = msgBody.loadUint(32);
    if (op == OP_WITHDRAW) {
        assert (sender.isSliceBitsEqual(loadOwner())) throw ERR_NOT_OWNER;
        val amount = msgBody.loadCoins();
        val reply = beginCell()
            .storeUint(0x18, 6)
            .storeSlice(sender)
            .storeCoins(amount)
            .storeUint(0, 1 + 4 + 4 + 64 + 32 + 1 + 1)
            .endCell();
        sendRawMessage(reply, SEND_MODE_REGULAR);
        return;
    }

    throw 0xFFFF;
}
"#;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uris_are_unique_and_scoped() {
    let mut uris: Vec<&str> = RESOURCES.iter().map(|resource| resource.uri).collect();
    assert!(uris.iter().all(|uri| uri.starts_with("tolk://")));
    uris.sort_unstable();
    uris.dedup();
    assert_eq!(uris.len(), RESOURCES.len());
  }

  #[test]
  fn read_returns_text_and_media_type() {
    let contents = read("tolk://examples/hello-world").expect("known resource");
    assert_eq!(contents.mime_type, "text/plain");
    assert!(contents.text.contains("return 42;"));
    assert!(read("tolk://examples/unknown").is_none());
  }
}
