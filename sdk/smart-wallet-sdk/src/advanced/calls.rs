//! Call data for the external factory and wallet contracts.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    interface ISmartWalletFactory {
        function createSmartWallet() external;
        function destroySmartWallet() external;
        function destroyAndRecreateSmartWallet() external;
        function getWalletAddress() external view returns (address);
    }

    interface ISmartWallet {
        function sendEther(address to, uint256 amount) external;
        function delegateCallToContract(address target, bytes data) external;
    }
}

pub fn create_smart_wallet() -> Bytes {
    ISmartWalletFactory::createSmartWalletCall {}.abi_encode().into()
}

pub fn destroy_smart_wallet() -> Bytes {
    ISmartWalletFactory::destroySmartWalletCall {}.abi_encode().into()
}

pub fn destroy_and_recreate_smart_wallet() -> Bytes {
    ISmartWalletFactory::destroyAndRecreateSmartWalletCall {}
        .abi_encode()
        .into()
}

pub fn get_wallet_address() -> Bytes {
    ISmartWalletFactory::getWalletAddressCall {}.abi_encode().into()
}

/// Decode the return data of `getWalletAddress()`.
pub fn decode_wallet_address(data: &[u8]) -> Option<Address> {
    ISmartWalletFactory::getWalletAddressCall::abi_decode_returns(data).ok()
}

pub fn send_ether(to: Address, amount: U256) -> Bytes {
    ISmartWallet::sendEtherCall { to, amount }.abi_encode().into()
}

pub fn delegate_call_to_contract(target: Address, data: Bytes) -> Bytes {
    ISmartWallet::delegateCallToContractCall { target, data }
        .abi_encode()
        .into()
}
