use xxhash_rust::const_xxh3::xxh3_64 as const_xxh3_64;

pub const fn method_id_hash(name: &str) -> u64 {
    const_xxh3_64(name.as_bytes())
}

/// Compile-time RPC method ID generator using xxHash3.
///
/// This macro computes a deterministic `u64` identifier from a string literal
/// at **compile time** using the xxh3-64 hash function.
///
/// ## Example
///
/// ```rust,no_run
/// use tenacio_rpc_service::rpc_method_id;
/// let id_1 = rpc_method_id!("getSizeX");
/// let id_2 = rpc_method_id!("getSizeY");
/// assert_ne!(id_1, id_2);
/// ```
#[macro_export]
macro_rules! rpc_method_id {
    ($name:literal) => {{
        const ID: u64 = $crate::method_id_hash($name);
        ID
    }};
}

/// Generates [`RpcOperation`](crate::RpcOperation) types from an operation
/// table.
///
/// Each entry names the generated type, the wire name, the arguments, an
/// optional result type and an optional `[idempotent]` marker. Arguments are
/// encoded as a single value (one argument) or a tuple (several); operations
/// without arguments or result use an empty payload.
///
/// ```rust,no_run
/// use tenacio_rpc_service::rpc_operations;
///
/// rpc_operations! {
///     /// Opens the file at `id`.
///     pub SetId => "setId" (id: String);
///     pub GetSizeX => "getSizeX" () -> i32 [idempotent];
///     pub GetIndex => "getIndex" (z: i32, c: i32, t: i32) -> i32;
/// }
/// ```
#[macro_export]
macro_rules! rpc_operations {
    () => {};

    (
        $(#[$meta:meta])*
        $vis:vis $name:ident => $wire:literal ( $($arg:ident : $arg_ty:ty),* $(,)? )
        $([ $mode:ident ])? ;
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::RpcOperation for $name {
            const NAME: &'static str = $wire;
            const METHOD_ID: u64 = $crate::rpc_method_id!($wire);
            const MODE: $crate::OperationMode = $crate::__rpc_operation_mode!($($mode)?);
            const RETURNS_VALUE: bool = false;

            type Input = $crate::__rpc_input_type!($($arg_ty),*);
            type Output = ();

            fn encode_request(input: Self::Input) -> Result<Vec<u8>, std::io::Error> {
                $crate::__rpc_encode_input!(input; $($arg_ty),*)
            }

            fn decode_request(bytes: &[u8]) -> Result<Self::Input, std::io::Error> {
                $crate::__rpc_decode_input!(bytes; $($arg_ty),*)
            }

            fn encode_response(_output: ()) -> Result<Vec<u8>, std::io::Error> {
                $crate::codec::encode_unit()
            }

            fn decode_response(bytes: &[u8]) -> Result<(), std::io::Error> {
                $crate::codec::decode_unit(bytes)
            }
        }

        $crate::rpc_operations!($($rest)*);
    };

    (
        $(#[$meta:meta])*
        $vis:vis $name:ident => $wire:literal ( $($arg:ident : $arg_ty:ty),* $(,)? )
        -> $out:ty $([ $mode:ident ])? ;
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::RpcOperation for $name {
            const NAME: &'static str = $wire;
            const METHOD_ID: u64 = $crate::rpc_method_id!($wire);
            const MODE: $crate::OperationMode = $crate::__rpc_operation_mode!($($mode)?);
            const RETURNS_VALUE: bool = true;

            type Input = $crate::__rpc_input_type!($($arg_ty),*);
            type Output = $out;

            fn encode_request(input: Self::Input) -> Result<Vec<u8>, std::io::Error> {
                $crate::__rpc_encode_input!(input; $($arg_ty),*)
            }

            fn decode_request(bytes: &[u8]) -> Result<Self::Input, std::io::Error> {
                $crate::__rpc_decode_input!(bytes; $($arg_ty),*)
            }

            fn encode_response(output: Self::Output) -> Result<Vec<u8>, std::io::Error> {
                $crate::codec::encode_value(&output)
            }

            fn decode_response(bytes: &[u8]) -> Result<Self::Output, std::io::Error> {
                $crate::codec::decode_value(bytes)
            }
        }

        $crate::rpc_operations!($($rest)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rpc_operation_mode {
    () => {
        $crate::OperationMode::Normal
    };
    (idempotent) => {
        $crate::OperationMode::Idempotent
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rpc_input_type {
    () => { () };
    ($ty:ty) => { $ty };
    ($($ty:ty),+) => { ($($ty),+) };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rpc_encode_input {
    ($input:ident;) => {{
        let () = $input;
        $crate::codec::encode_unit()
    }};
    ($input:ident; $($ty:ty),+) => {
        $crate::codec::encode_value(&$input)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rpc_decode_input {
    ($bytes:ident;) => {
        $crate::codec::decode_unit($bytes)
    };
    ($bytes:ident; $($ty:ty),+) => {
        $crate::codec::decode_value($bytes)
    };
}
