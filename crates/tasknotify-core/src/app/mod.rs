//! App - アプリケーション層
//!
//! このモジュールは、domain と ports を組み合わせて通知ロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Differ**: 2 つのスナップショットから ChangeEvent を作る
//! - **Directory**: 人名 → アドレスの解決
//! - **DigestFormatter**: バッファされたイベントを件名と本文にする
//! - **DebounceAggregator**: 宛先ごとのバッファと遅延送信
//! - **ChangeNotifier**: 保存処理から呼ばれる入口（`on_saved`）
//! - **NotifierBuilder**: 上記のワイヤリング

pub mod builder;
pub mod differ;
pub mod directory;
pub mod digest;
pub mod aggregator;
pub mod notifier;
pub mod retry;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, NotifierBuilder};
pub use self::differ::diff;
pub use self::directory::Directory;
pub use self::digest::{Digest, DigestFormatter};
pub use self::aggregator::{DEFAULT_DEBOUNCE, DebounceAggregator};
pub use self::notifier::{ChangeNotifier, DispatchSummary};
pub use self::retry::DeliveryPolicy;
pub use self::status::NotifierStats;
