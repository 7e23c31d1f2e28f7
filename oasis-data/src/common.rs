pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use derivative::Derivative;
pub use futures::stream::{self, Stream, StreamExt as _};
pub use itertools::Itertools as _;
pub use log::{debug, info, warn};
pub use ndarray::{ArrayD, Axis, IxDyn, Slice};
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    cmp,
    collections::HashSet,
    fmt::{self, Debug},
    fs,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
pub use tch::{Kind, Tensor};
